//! `recall init`: create the cache root directory.

use recall_config::CacheConfiguration;

use crate::GlobalArgs;

/// Runs the `recall init` command.
///
/// Creates the resolved root and any missing parents. Running it on an
/// existing root is not an error.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let root = global.cache_root()?;
    let existed = root.is_dir();
    let config = CacheConfiguration::new(&root)?;

    if !global.quiet {
        let verb = if existed { "Using" } else { "Created" };
        eprintln!("  {verb} cache root {}", config.root().display());
    }
    Ok(0)
}
