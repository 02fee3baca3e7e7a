use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable holding the Gemini credential.
pub const API_KEY_VAR: &str = "API_KEY";

/// Process-wide configuration, read once at startup.
#[derive(Clone, Default)]
pub struct Config {
    pub api_key: Option<String>,
    /// `.env` file that was applied at startup, if any.
    pub env_file: Option<PathBuf>,
}

impl Config {
    /// Loads `.env` from the working directory (existing variables win), then reads the key.
    /// Runs before logging is set up, so the caller reports `env_file`.
    pub fn from_env() -> Self {
        let dir = std::env::current_dir().unwrap_or_default();
        Self::load_from(&dir)
    }

    pub fn load_from(dir: &Path) -> Self {
        let path = dir.join(".env");
        let env_file = dotenv::from_path(&path).ok().map(|_| path);
        Self {
            env_file,
            ..Self::from_value(std::env::var(API_KEY_VAR).ok())
        }
    }

    fn from_value(value: Option<String>) -> Self {
        let api_key = value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        Self {
            api_key,
            env_file: None,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("env_file", &self.env_file)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_key_counts_as_missing() {
        assert!(!Config::from_value(None).has_api_key());
        assert!(!Config::from_value(Some("   ".to_string())).has_api_key());
    }

    #[test]
    fn test_key_is_trimmed() {
        let config = Config::from_value(Some(" abc123\n".to_string()));
        assert_eq!(config.api_key.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_load_from_records_applied_env_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "PROMPT_ENHANCER_DOTENV_CHECK=loaded\n").unwrap();

        let config = Config::load_from(dir.path());
        assert_eq!(config.env_file, Some(dir.path().join(".env")));
        assert_eq!(std::env::var("PROMPT_ENHANCER_DOTENV_CHECK").as_deref(), Ok("loaded"));
    }

    #[test]
    fn test_load_from_without_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path());
        assert!(config.env_file.is_none());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = Config::from_value(Some("secret-key".to_string()));
        let printed = format!("{:?}", config);
        assert!(!printed.contains("secret-key"));
        assert!(printed.contains("redacted"));
    }
}
