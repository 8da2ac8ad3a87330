//! Function signatures and argument binding.
//!
//! A memoized function declares its parameters up front. Each call's
//! positional and keyword arguments are bound against that declaration into
//! one [`BoundArgs`] in declared order, so `f(2, 3)`, `f(2, y=3)` and
//! `f(y=3, x=2)` all bind identically.

use recall_common::Value;

use crate::error::CacheError;

/// How a parameter accepts arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Bound by position or by name.
    Named,
    /// Collects any extra positional arguments (`*args`).
    VarPositional,
    /// Collects any extra keyword arguments (`**kwargs`).
    VarKeyword,
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    name: String,
    kind: ParamKind,
    default: Option<Value>,
}

impl Param {
    /// A parameter that must be supplied.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Named,
            default: None,
        }
    }

    /// A parameter that falls back to `default` when not supplied.
    pub fn with_default(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Named,
            default: Some(default.into()),
        }
    }

    /// A variadic positional parameter. Binding always fails on these.
    pub fn var_positional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::VarPositional,
            default: None,
        }
    }

    /// A variadic keyword parameter. Binding always fails on these.
    pub fn var_keyword(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::VarKeyword,
            default: None,
        }
    }

    /// Parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter kind.
    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    /// Default value, if any.
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

/// A function's stable name and declared parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    name: String,
    params: Vec<Param>,
}

impl Signature {
    /// Creates a signature from a name and parameter list.
    pub fn new(name: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// Shorthand for a signature whose parameters are all required.
    pub fn with_params(name: impl Into<String>, params: &[&str]) -> Self {
        Self::new(name, params.iter().map(|p| Param::required(*p)).collect())
    }

    /// The function's stable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameters in order.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Binds call arguments to the declared parameters.
    ///
    /// Positional arguments fill parameters left to right, keyword arguments
    /// fill by name, and defaults fill whatever is left. Fails on variadic
    /// parameters, surplus positional arguments, unknown or repeated
    /// keywords, and missing required arguments.
    pub fn bind(&self, args: &CallArgs) -> Result<BoundArgs, CacheError> {
        if let Some(p) = self.params.iter().find(|p| p.kind != ParamKind::Named) {
            return Err(CacheError::signature(
                &self.name,
                format!("variadic parameter '{}' is not supported", p.name),
            ));
        }
        for (i, p) in self.params.iter().enumerate() {
            if self.params[..i].iter().any(|q| q.name == p.name) {
                return Err(CacheError::signature(
                    &self.name,
                    format!("duplicate parameter '{}'", p.name),
                ));
            }
        }
        if args.positional.len() > self.params.len() {
            return Err(CacheError::signature(
                &self.name,
                format!(
                    "takes {} positional arguments but {} were given",
                    self.params.len(),
                    args.positional.len()
                ),
            ));
        }

        let mut slots: Vec<Option<Value>> = vec![None; self.params.len()];
        for (slot, value) in slots.iter_mut().zip(&args.positional) {
            *slot = Some(value.clone());
        }

        for (name, value) in &args.keyword {
            let index = self
                .params
                .iter()
                .position(|p| &p.name == name)
                .ok_or_else(|| {
                    CacheError::signature(
                        &self.name,
                        format!("unexpected keyword argument '{name}'"),
                    )
                })?;
            if slots[index].is_some() {
                return Err(CacheError::signature(
                    &self.name,
                    format!("got multiple values for argument '{name}'"),
                ));
            }
            slots[index] = Some(value.clone());
        }

        let mut entries = Vec::with_capacity(self.params.len());
        for (param, slot) in self.params.iter().zip(slots) {
            let value = match slot.or_else(|| param.default.clone()) {
                Some(v) => v,
                None => {
                    return Err(CacheError::signature(
                        &self.name,
                        format!("missing required argument '{}'", param.name),
                    ))
                }
            };
            entries.push((param.name.clone(), value));
        }
        Ok(BoundArgs { entries })
    }
}

/// Arguments of a single call, as the caller wrote them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    positional: Vec<Value>,
    keyword: Vec<(String, Value)>,
}

impl CallArgs {
    /// An empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Appends a keyword argument.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.push((name.into(), value.into()));
        self
    }

    /// Positional arguments in call order.
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// Keyword arguments in call order.
    pub fn keyword(&self) -> &[(String, Value)] {
        &self.keyword
    }
}

/// Arguments bound to parameter names, in declared parameter order.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundArgs {
    entries: Vec<(String, Value)>,
}

impl BoundArgs {
    /// Looks up an argument by parameter name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// `(name, value)` pairs in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of bound parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the function takes no parameters.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
