//! Configuration system for the keylab CLI.

use keylab_crypto::digest::DigestKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// keylab configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Key file locations
    pub keys: KeysConfig,
    /// Cipher defaults
    pub cipher: CipherConfig,
    /// Digest selection
    pub digest: DigestConfig,
    /// Progress display
    pub progress: ProgressConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Key file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeysConfig {
    /// Signing key file
    #[serde(default = "default_signing_key_file")]
    pub signing_key_file: PathBuf,
    /// Symmetric key file
    #[serde(default = "default_symmetric_key_file")]
    pub symmetric_key_file: PathBuf,
}

/// Cipher defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CipherConfig {
    /// File that `--save` writes ciphertext to and decrypt reads by default
    #[serde(default = "default_message_file")]
    pub message_file: PathBuf,
}

/// Digest selection
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DigestConfig {
    /// Algorithm for key derivation and signing
    #[serde(default)]
    pub algorithm: DigestKind,
}

/// Progress display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Show a progress bar when hashing files at least this large
    #[serde(default = "default_progress_threshold")]
    pub threshold_bytes: u64,
    /// Disable progress bars entirely when false
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

// Default values

fn default_signing_key_file() -> PathBuf {
    PathBuf::from("keys.json")
}

fn default_symmetric_key_file() -> PathBuf {
    PathBuf::from("symmetric_key.json")
}

fn default_message_file() -> PathBuf {
    PathBuf::from("email.txt")
}

fn default_progress_threshold() -> u64 {
    8 * 1024 * 1024 // 8 MB
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            signing_key_file: default_signing_key_file(),
            symmetric_key_file: default_symmetric_key_file(),
        }
    }
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            message_file: default_message_file(),
        }
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            threshold_bytes: default_progress_threshold(),
            enabled: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, contents)?;
        Ok(())
    }

    /// Get default config path
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("keylab/config.toml")
    }

    /// Load config from default path, or create default if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if reading or creating the config fails.
    pub fn load_or_default() -> anyhow::Result<Self> {
        let path = Self::default_path();

        if path.exists() {
            Self::load(&path)
        } else {
            let config = Self::default();
            if let Err(e) = config.save(&path) {
                tracing::warn!(path = %path.display(), error = %e, "could not write default config");
            }
            Ok(config)
        }
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid.
    pub fn validate(&self) -> anyhow::Result<()> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!(
                "Invalid log level: {}. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            );
        }

        for (name, path) in [
            ("keys.signing_key_file", &self.keys.signing_key_file),
            ("keys.symmetric_key_file", &self.keys.symmetric_key_file),
            ("cipher.message_file", &self.cipher.message_file),
        ] {
            if path.as_os_str().is_empty() {
                anyhow::bail!("{name} must not be empty");
            }
        }

        // A key file holds exactly one record
        if self.keys.signing_key_file == self.keys.symmetric_key_file {
            anyhow::bail!(
                "Signing and symmetric keys cannot share a file: {}",
                self.keys.signing_key_file.display()
            );
        }

        for key_file in [&self.keys.signing_key_file, &self.keys.symmetric_key_file] {
            if self.cipher.message_file == *key_file {
                anyhow::bail!(
                    "cipher.message_file cannot be a key file: {}",
                    key_file.display()
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.keys.signing_key_file, PathBuf::from("keys.json"));
        assert_eq!(config.keys.symmetric_key_file, PathBuf::from("symmetric_key.json"));
        assert_eq!(config.cipher.message_file, PathBuf::from("email.txt"));
        assert_eq!(config.digest.algorithm, DigestKind::Sha256);
        assert!(config.progress.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "DEBUG".to_string();
        assert!(config.validate().is_ok());

        config.cipher.message_file = PathBuf::new();
        assert!(config.validate().is_err());

        config.cipher.message_file = default_message_file();
        config.keys.symmetric_key_file = config.keys.signing_key_file.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_message_file_cannot_be_a_key_file() {
        let mut config = Config::default();

        config.cipher.message_file = config.keys.symmetric_key_file.clone();
        assert!(config.validate().is_err());

        config.cipher.message_file = config.keys.signing_key_file.clone();
        assert!(config.validate().is_err());

        config.cipher.message_file = default_message_file();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.keys.signing_key_file, deserialized.keys.signing_key_file);
        assert_eq!(config.progress.threshold_bytes, deserialized.progress.threshold_bytes);
        assert_eq!(config.digest.algorithm, deserialized.digest.algorithm);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [digest]
            algorithm = "blake3"

            [keys]
            signing_key_file = "alice.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.digest.algorithm, DigestKind::Blake3);
        assert_eq!(config.keys.signing_key_file, PathBuf::from("alice.json"));
        assert_eq!(config.keys.symmetric_key_file, PathBuf::from("symmetric_key.json"));
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_unknown_algorithm_rejected() {
        let parsed: Result<Config, _> = toml::from_str("[digest]\nalgorithm = \"md5\"\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/config.toml");

        let mut config = Config::default();
        config.progress.threshold_bytes = 1024;
        config.logging.file = Some(PathBuf::from("keylab.log"));
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.progress.threshold_bytes, 1024);
        assert_eq!(loaded.logging.file, Some(PathBuf::from("keylab.log")));
    }
}
