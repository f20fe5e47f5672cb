use std::path::PathBuf;

/// Get the Taxonomer home directory
/// Checks TAXONOMER_HOME environment variable, falls back to ${HOME}/.taxonomer
///
/// Not cached: test environments repoint the variable between cases.
pub fn taxonomer_home() -> PathBuf {
    if let Ok(path) = std::env::var("TAXONOMER_HOME") {
        return PathBuf::from(path);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".taxonomer")
}

/// Get the cache directory used for downloaded source archives
/// Checks TAXONOMER_CACHE_DIR environment variable, falls back to TAXONOMER_HOME/cache
pub fn taxonomer_cache_dir() -> PathBuf {
    if let Ok(path) = std::env::var("TAXONOMER_CACHE_DIR") {
        PathBuf::from(path)
    } else {
        taxonomer_home().join("cache")
    }
}

/// Default location of the taxonomy store
pub fn default_database_path() -> PathBuf {
    taxonomer_home().join("taxonomy.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_database_path() {
        let path = default_database_path();
        assert!(path.ends_with("taxonomy.db"));
        assert!(path.starts_with(taxonomer_home()));
    }

    #[test]
    fn test_cache_dir_under_home_by_default() {
        if std::env::var("TAXONOMER_CACHE_DIR").is_err() {
            assert!(taxonomer_cache_dir().ends_with("cache"));
        }
    }
}
