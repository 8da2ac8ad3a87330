//! Dense n-dimensional numeric arrays backed by raw element bytes.
//!
//! An [`NdArray`] keeps its elements as little-endian bytes in row-major
//! order together with a [`DType`] tag and a shape. Keeping the bytes as the
//! source of truth lets the hasher digest array arguments without going
//! through a textual form, and lets the codec persist them bit-exactly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of leading and trailing elements shown when an array is summarized.
const SUMMARY_EDGE: usize = 3;

/// Element type of an [`NdArray`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    /// One byte per element, zero is `false`.
    Bool,
    /// Signed 8-bit integer.
    I8,
    /// Signed 16-bit integer.
    I16,
    /// Signed 32-bit integer.
    I32,
    /// Signed 64-bit integer.
    I64,
    /// Unsigned 8-bit integer.
    U8,
    /// Unsigned 16-bit integer.
    U16,
    /// Unsigned 32-bit integer.
    U32,
    /// Unsigned 64-bit integer.
    U64,
    /// IEEE 754 single precision.
    F32,
    /// IEEE 754 double precision.
    F64,
}

impl DType {
    /// Size of one element in bytes.
    pub fn size(self) -> usize {
        match self {
            DType::Bool | DType::I8 | DType::U8 => 1,
            DType::I16 | DType::U16 => 2,
            DType::I32 | DType::U32 | DType::F32 => 4,
            DType::I64 | DType::U64 | DType::F64 => 8,
        }
    }

    /// Conventional lowercase name (`"float64"`, `"int32"`, ...).
    pub fn name(self) -> &'static str {
        match self {
            DType::Bool => "bool",
            DType::I8 => "int8",
            DType::I16 => "int16",
            DType::I32 => "int32",
            DType::I64 => "int64",
            DType::U8 => "uint8",
            DType::U16 => "uint16",
            DType::U32 => "uint32",
            DType::U64 => "uint64",
            DType::F32 => "float32",
            DType::F64 => "float64",
        }
    }

    /// Renders one element from its little-endian bytes.
    fn format_element(self, bytes: &[u8]) -> String {
        match self {
            DType::Bool => (if bytes[0] != 0 { "True" } else { "False" }).to_string(),
            DType::I8 => i8::read_le(bytes).to_string(),
            DType::I16 => i16::read_le(bytes).to_string(),
            DType::I32 => i32::read_le(bytes).to_string(),
            DType::I64 => i64::read_le(bytes).to_string(),
            DType::U8 => u8::read_le(bytes).to_string(),
            DType::U16 => u16::read_le(bytes).to_string(),
            DType::U32 => u32::read_le(bytes).to_string(),
            DType::U64 => u64::read_le(bytes).to_string(),
            DType::F32 => format!("{:?}", f32::read_le(bytes)),
            DType::F64 => format!("{:?}", f64::read_le(bytes)),
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A Rust scalar type that can be stored in an [`NdArray`].
pub trait Element: Copy {
    /// The dtype tag for this element type.
    const DTYPE: DType;

    /// Appends the little-endian encoding of `self`.
    fn write_le(self, out: &mut Vec<u8>);

    /// Decodes one element from exactly [`DType::size`] bytes.
    fn read_le(bytes: &[u8]) -> Self;
}

macro_rules! impl_element {
    ($($ty:ty => $dtype:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const DTYPE: DType = DType::$dtype;

                fn write_le(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }

                fn read_le(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$ty>()];
                    buf.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(buf)
                }
            }
        )*
    };
}

impl_element!(
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
);

impl Element for bool {
    const DTYPE: DType = DType::Bool;

    fn write_le(self, out: &mut Vec<u8>) {
        out.push(self as u8);
    }

    fn read_le(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

/// Error raised when array data does not fit the requested shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    /// The data length differs from what the shape implies.
    #[error("shape {shape:?} needs {expected} bytes of {dtype} data, got {actual}")]
    Mismatch {
        /// Requested shape.
        shape: Vec<usize>,
        /// Element type of the data.
        dtype: DType,
        /// Byte length implied by the shape.
        expected: usize,
        /// Byte length actually supplied.
        actual: usize,
    },

    /// The shape's byte length does not fit in `usize`.
    #[error("shape {shape:?} of {dtype} elements is too large")]
    Overflow {
        /// Requested shape.
        shape: Vec<usize>,
        /// Element type of the data.
        dtype: DType,
    },
}

/// Byte length of `shape` elements of `dtype`, or `None` on overflow.
fn byte_len(dtype: DType, shape: &[usize]) -> Option<usize> {
    shape
        .iter()
        .try_fold(dtype.size(), |acc, &dim| acc.checked_mul(dim))
}

/// A dense, row-major n-dimensional array of a single numeric dtype.
///
/// Equality compares dtype, shape and the raw element bytes, so two arrays
/// are equal exactly when every element has the same bit pattern.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawNdArray")]
pub struct NdArray {
    dtype: DType,
    shape: Vec<usize>,
    data: Vec<u8>,
}

/// Unchecked wire form of [`NdArray`]; decoding goes through
/// [`NdArray::from_raw`].
#[derive(Deserialize)]
struct RawNdArray {
    dtype: DType,
    shape: Vec<usize>,
    data: Vec<u8>,
}

impl TryFrom<RawNdArray> for NdArray {
    type Error = ShapeError;

    fn try_from(raw: RawNdArray) -> Result<Self, Self::Error> {
        NdArray::from_raw(raw.dtype, raw.shape, raw.data)
    }
}

impl NdArray {
    /// Creates an array from raw little-endian bytes.
    pub fn from_raw(dtype: DType, shape: Vec<usize>, data: Vec<u8>) -> Result<Self, ShapeError> {
        let Some(expected) = byte_len(dtype, &shape) else {
            return Err(ShapeError::Overflow { shape, dtype });
        };
        if expected != data.len() {
            return Err(ShapeError::Mismatch {
                shape,
                dtype,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { dtype, shape, data })
    }

    /// Creates a one-dimensional array from a vector of elements.
    pub fn from_vec<T: Element>(values: Vec<T>) -> Self {
        let shape = vec![values.len()];
        Self {
            dtype: T::DTYPE,
            shape,
            data: encode(&values),
        }
    }

    /// Creates an array with the given shape from row-major elements.
    pub fn from_shape_vec<T: Element>(shape: Vec<usize>, values: Vec<T>) -> Result<Self, ShapeError> {
        Self::from_raw(T::DTYPE, shape, encode(&values))
    }

    /// `[start, start + 1, ..., end - 1]` as an `int64` array.
    pub fn arange(start: i64, end: i64) -> Self {
        Self::from_vec((start..end).collect::<Vec<i64>>())
    }

    /// The `n x n` identity matrix as a `float64` array.
    pub fn eye(n: usize) -> Result<Self, ShapeError> {
        let shape = vec![n, n];
        if byte_len(DType::F64, &shape).is_none() {
            return Err(ShapeError::Overflow {
                shape,
                dtype: DType::F64,
            });
        }
        let mut values = vec![0.0f64; n * n];
        for i in 0..n {
            values[i * n + i] = 1.0;
        }
        Ok(Self {
            dtype: DType::F64,
            shape,
            data: encode(&values),
        })
    }

    /// An array of the given shape with every element set to `value`.
    pub fn full<T: Element>(shape: Vec<usize>, value: T) -> Result<Self, ShapeError> {
        let Some(bytes) = byte_len(T::DTYPE, &shape) else {
            return Err(ShapeError::Overflow {
                shape,
                dtype: T::DTYPE,
            });
        };
        let mut data = Vec::with_capacity(bytes);
        for _ in 0..bytes / T::DTYPE.size() {
            value.write_le(&mut data);
        }
        Ok(Self {
            dtype: T::DTYPE,
            shape,
            data,
        })
    }

    /// Element type.
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Extent of each dimension.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.data.len() / self.dtype.size()
    }

    /// Returns `true` if the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw little-endian element bytes in row-major order.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Decodes the elements as `T`, or `None` if `T` is not this array's dtype.
    pub fn to_vec<T: Element>(&self) -> Option<Vec<T>> {
        if T::DTYPE != self.dtype {
            return None;
        }
        Some(
            self.data
                .chunks_exact(self.dtype.size())
                .map(T::read_le)
                .collect(),
        )
    }

    /// Element-wise combination of two arrays of the same dtype and shape.
    ///
    /// Returns `None` on a dtype or shape mismatch.
    pub fn zip_map<T: Element>(&self, other: &NdArray, f: impl Fn(T, T) -> T) -> Option<NdArray> {
        if self.shape != other.shape {
            return None;
        }
        let lhs = self.to_vec::<T>()?;
        let rhs = other.to_vec::<T>()?;
        let values: Vec<T> = lhs.into_iter().zip(rhs).map(|(a, b)| f(a, b)).collect();
        Some(Self {
            dtype: T::DTYPE,
            shape: self.shape.clone(),
            data: encode(&values),
        })
    }

    fn element_strings(&self) -> Vec<String> {
        let size = self.dtype.size();
        let count = self.len();
        let render = |i: usize| self.dtype.format_element(&self.data[i * size..(i + 1) * size]);
        if count <= SUMMARY_EDGE * 2 {
            (0..count).map(render).collect()
        } else {
            let mut out: Vec<String> = (0..SUMMARY_EDGE).map(render).collect();
            out.push("...".to_string());
            out.extend((count - SUMMARY_EDGE..count).map(render));
            out
        }
    }
}

fn encode<T: Element>(values: &[T]) -> Vec<u8> {
    let mut data = Vec::with_capacity(values.len() * T::DTYPE.size());
    for v in values {
        v.write_le(&mut data);
    }
    data
}

/// Summarized rendering: dtype, shape, and at most six elements.
impl fmt::Display for NdArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "array({}, {:?}, [{}])",
            self.dtype,
            self.shape,
            self.element_strings().join(", ")
        )
    }
}

impl fmt::Debug for NdArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NdArray({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_is_one_dimensional() {
        let a = NdArray::from_vec(vec![1.5f64, 2.5, 3.5]);
        assert_eq!(a.dtype(), DType::F64);
        assert_eq!(a.shape(), &[3]);
        assert_eq!(a.len(), 3);
        assert_eq!(a.as_bytes().len(), 24);
        assert_eq!(a.to_vec::<f64>().unwrap(), vec![1.5, 2.5, 3.5]);
    }

    #[test]
    fn to_vec_wrong_dtype_is_none() {
        let a = NdArray::arange(0, 4);
        assert!(a.to_vec::<f32>().is_none());
        assert_eq!(a.to_vec::<i64>().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn from_shape_vec_validates_length() {
        let ok = NdArray::from_shape_vec(vec![2, 3], vec![0i32; 6]).unwrap();
        assert_eq!(ok.ndim(), 2);

        let err = NdArray::from_shape_vec(vec![2, 3], vec![0i32; 5]).unwrap_err();
        assert!(matches!(
            err,
            ShapeError::Mismatch {
                expected: 24,
                actual: 20,
                ..
            }
        ));
        assert!(err.to_string().contains("int32"));
    }

    #[test]
    fn oversized_shapes_are_rejected() {
        let err = NdArray::from_raw(DType::F64, vec![usize::MAX, 2], Vec::new()).unwrap_err();
        assert!(matches!(err, ShapeError::Overflow { .. }));
        assert!(matches!(
            NdArray::eye(usize::MAX),
            Err(ShapeError::Overflow { .. })
        ));
        assert!(matches!(
            NdArray::full(vec![usize::MAX, usize::MAX], 0u8),
            Err(ShapeError::Overflow { .. })
        ));
    }

    #[test]
    fn decoding_checks_shape_against_data() {
        let good = NdArray::arange(0, 4);
        let json = serde_json::to_string(&good).unwrap();
        assert_eq!(serde_json::from_str::<NdArray>(&json).unwrap(), good);

        let mut tampered: serde_json::Value = serde_json::from_str(&json).unwrap();
        tampered["shape"] = serde_json::json!([5]);
        let err = serde_json::from_value::<NdArray>(tampered).unwrap_err();
        assert!(err.to_string().contains("needs 40 bytes"));
    }

    #[test]
    fn eye_has_unit_diagonal() {
        let e = NdArray::eye(3).unwrap();
        assert_eq!(e.shape(), &[3, 3]);
        assert_eq!(
            e.to_vec::<f64>().unwrap(),
            vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]
        );
    }

    #[test]
    fn equality_is_shape_sensitive() {
        let flat = NdArray::from_vec(vec![1u8, 2, 3, 4]);
        let square = NdArray::from_shape_vec(vec![2, 2], vec![1u8, 2, 3, 4]).unwrap();
        assert_eq!(flat.as_bytes(), square.as_bytes());
        assert_ne!(flat, square);
    }

    #[test]
    fn zip_map_adds() {
        let a = NdArray::arange(0, 5);
        let b = NdArray::arange(10, 15);
        let sum = a.zip_map::<i64>(&b, |x, y| x + y).unwrap();
        assert_eq!(sum.to_vec::<i64>().unwrap(), vec![10, 12, 14, 16, 18]);
        assert!(a.zip_map::<i64>(&NdArray::arange(0, 2), |x, y| x + y).is_none());
    }

    #[test]
    fn full_fills_every_element() {
        let a = NdArray::full(vec![2, 2], true).unwrap();
        assert_eq!(a.dtype(), DType::Bool);
        assert_eq!(a.to_vec::<bool>().unwrap(), vec![true; 4]);
    }

    #[test]
    fn display_summarizes_large_arrays() {
        let small = NdArray::arange(0, 3);
        assert_eq!(small.to_string(), "array(int64, [3], [0, 1, 2])");

        let large = NdArray::arange(0, 1000);
        assert_eq!(
            large.to_string(),
            "array(int64, [1000], [0, 1, 2, ..., 997, 998, 999])"
        );
    }

    #[test]
    fn float_elements_keep_decimal_point() {
        let a = NdArray::from_vec(vec![1.0f32, 0.25]);
        assert_eq!(a.to_string(), "array(float32, [2], [1.0, 0.25])");
    }
}
