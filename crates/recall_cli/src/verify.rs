//! `recall verify`: decode every entry and report the corrupt ones.

use crate::list::inspect_all;
use crate::GlobalArgs;

/// Runs the `recall verify` command.
///
/// Returns exit code 1 if any entry fails to decode. Corrupt entries are
/// reported, not removed; the next memoized call overwrites them.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let store = global.open_store()?;
    let reports = inspect_all(&store)?;

    let mut corrupt = 0usize;
    for report in &reports {
        if let Some(problem) = &report.problem {
            corrupt += 1;
            eprintln!("  corrupt {}: {problem}", report.key);
        }
    }

    if !global.quiet {
        eprintln!(
            "  Checked {} entries, {} corrupt",
            reports.len(),
            corrupt
        );
    }
    Ok(if corrupt == 0 { 0 } else { 1 })
}
