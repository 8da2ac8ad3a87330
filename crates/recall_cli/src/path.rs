//! `recall path`: print the entry path for a key.

use recall_cache::CacheStore;

use crate::GlobalArgs;

/// Runs the `recall path` command.
///
/// Does not require the root or the entry to exist.
pub fn run(key: &str, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    CacheStore::validate_key(key)?;
    let root = global.cache_root()?;
    println!("{}", CacheStore::path_in(&root, key).display());
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::global_at;

    #[test]
    fn works_without_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("never_created");
        assert_eq!(run("abc", &global_at(&root)).unwrap(), 0);
        assert!(!root.exists());
    }

    #[test]
    fn rejects_keys_outside_root() {
        let dir = tempfile::tempdir().unwrap();
        let err = run("../abc", &global_at(dir.path())).unwrap_err();
        assert!(err.to_string().contains("invalid cache key"));
    }
}
