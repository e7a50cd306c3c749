use std::path::PathBuf;

use anyhow::bail;
use todo_store::DEFAULT_STORAGE_KEY;

const DATA_DIR_NAME: &str = ".todo-store";

/// Where and under which key the todo list lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoConfig {
    pub data_dir: PathBuf,
    pub storage_key: String,
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
}

impl Default for TodoConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl TodoConfig {
    /// Build a config from optional overrides (flags or environment),
    /// falling back to defaults for anything not given.
    pub fn resolve(data_dir: Option<PathBuf>, storage_key: Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(dir) = data_dir {
            config.data_dir = dir;
        }
        if let Some(key) = storage_key {
            let key = key.trim().to_string();
            if key.is_empty() || key.contains(['/', '\\']) || key.contains("..") {
                bail!("invalid storage key {:?}", key);
            }
            config.storage_key = key;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TodoConfig::resolve(None, None).unwrap();
        assert_eq!(config.storage_key, "todos");
        assert!(config.data_dir.ends_with(DATA_DIR_NAME));
    }

    #[test]
    fn test_overrides() {
        let config =
            TodoConfig::resolve(Some(PathBuf::from("/tmp/todos")), Some(" work ".to_string()))
                .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/todos"));
        assert_eq!(config.storage_key, "work");
    }

    #[test]
    fn test_rejects_path_like_key() {
        assert!(TodoConfig::resolve(None, Some("../etc".to_string())).is_err());
        assert!(TodoConfig::resolve(None, Some("  ".to_string())).is_err());
    }
}
