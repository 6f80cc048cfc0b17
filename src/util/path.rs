// src/util/path.rs
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default root of the model cache when none is configured.
pub fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("embr")
}

/// Shared model cache folder, `<cache_root>/models`.
///
/// Created with parents on demand. `create_dir_all` succeeds when the
/// directory already exists, including when a concurrent caller created it
/// first.
pub fn models_cache_dir(cache_root: &Path) -> io::Result<PathBuf> {
    let folder = cache_root.join("models");
    fs::create_dir_all(&folder)?;
    Ok(folder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_missing_folder_when_models_cache_dir_then_created() {
        let dir = tempfile::tempdir().unwrap();
        let folder = models_cache_dir(dir.path()).unwrap();
        assert!(folder.is_dir());
        assert!(folder.ends_with("models"));
    }

    #[test]
    fn given_existing_folder_when_models_cache_dir_then_ok() {
        let dir = tempfile::tempdir().unwrap();
        let first = models_cache_dir(dir.path()).unwrap();
        let second = models_cache_dir(dir.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn given_nested_cache_root_when_models_cache_dir_then_parents_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        let folder = models_cache_dir(&nested).unwrap();
        assert!(folder.is_dir());
    }
}
