//! `recall list`: one row per cache entry.

use recall_cache::{peek_header, CacheError, CacheStore, Lookup};
use serde_json::json;

use crate::{GlobalArgs, ListArgs, ReportFormat};

/// What inspecting one entry found.
#[derive(Debug)]
pub struct EntryReport {
    /// Cache key.
    pub key: String,
    /// File size in bytes.
    pub size: u64,
    /// Compression flag from the header, if the header is readable.
    pub compressed: Option<bool>,
    /// Why the entry failed to decode, if it did.
    pub problem: Option<String>,
}

impl EntryReport {
    /// Whether the entry decoded cleanly.
    pub fn is_ok(&self) -> bool {
        self.problem.is_none()
    }
}

/// Reads and fully decodes one entry.
pub fn inspect(store: &CacheStore, key: &str) -> Result<EntryReport, Box<dyn std::error::Error>> {
    let path = store.path(key);
    let raw = std::fs::read(&path).map_err(|e| CacheError::Io {
        path: path.clone(),
        source: e,
    })?;
    let compressed = peek_header(&raw).ok().map(|h| h.compressed);
    let problem = match store.read(key)? {
        Lookup::Hit(_) => None,
        Lookup::Absent => Some("entry disappeared while reading".to_string()),
        Lookup::Corrupt(e) => Some(e.to_string()),
    };
    Ok(EntryReport {
        key: key.to_string(),
        size: raw.len() as u64,
        compressed,
        problem,
    })
}

/// Inspects every entry under the store's root, in key order.
pub fn inspect_all(store: &CacheStore) -> Result<Vec<EntryReport>, Box<dyn std::error::Error>> {
    store.keys()?.iter().map(|key| inspect(store, key)).collect()
}

/// Runs the `recall list` command.
pub fn run(args: &ListArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let store = global.open_store()?;
    let reports = inspect_all(&store)?;
    println!("{}", render(&reports, args.format)?);
    Ok(0)
}

fn render(reports: &[EntryReport], format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(render_text(reports)),
        ReportFormat::Json => {
            let rows: Vec<_> = reports
                .iter()
                .map(|r| {
                    json!({
                        "key": r.key,
                        "size": r.size,
                        "compressed": r.compressed,
                        "status": if r.is_ok() { "ok" } else { "corrupt" },
                    })
                })
                .collect();
            serde_json::to_string_pretty(&rows)
        }
    }
}

fn render_text(reports: &[EntryReport]) -> String {
    if reports.is_empty() {
        return "no entries".to_string();
    }
    let width = reports.iter().map(|r| r.key.len()).max().unwrap_or(0);
    reports
        .iter()
        .map(|r| {
            let compressed = match r.compressed {
                Some(true) => "zlib",
                Some(false) => "raw",
                None => "-",
            };
            let status = if r.is_ok() { "" } else { "  corrupt" };
            format!("{:<width$}  {:>10}  {compressed:<4}{status}", r.key, r.size)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
