//! # Ledger Configuration
//!
//! Ledger-wide settings kept in a small YAML file, created with defaults the
//! first time it is looked up.
//!
//! ## YAML Format
//!
//! ```yaml
//! id_size: 4
//! id_prefix: Rec
//! separator: ";"
//! timestamp_format: "%Y-%m-%d %H:%M:%S"
//! ```

use anyhow::{bail, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::storage::csv::table_file::DEFAULT_SEPARATOR;
use crate::storage::CsvStorage;

/// Settings shared by every ledger built from the same configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Zero-padding width of the numeric part of record ids
    pub id_size: usize,
    /// Text that precedes the numeric part of record ids
    pub id_prefix: String,
    /// Column separator of ledger files
    pub separator: char,
    /// chrono format of `RecTimestamp`
    pub timestamp_format: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            id_size: 4,
            id_prefix: "Rec".to_string(),
            separator: DEFAULT_SEPARATOR as char,
            timestamp_format: shared::TIMESTAMP_FORMAT.to_string(),
        }
    }
}

impl LedgerConfig {
    /// Load the configuration from `path`, creating a default file if it doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let yaml_content = fs::read_to_string(path)?;
            let config: LedgerConfig = serde_yaml::from_str(&yaml_content)?;
            config.validate()?;
            debug!("Loaded ledger config from {:?}", path);
            Ok(config)
        } else {
            let config = LedgerConfig::default();
            config.save(path)?;
            info!("Created default ledger config at {:?}", path);
            Ok(config)
        }
    }

    /// Save the configuration to `path` using a temp file
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let yaml_content = serde_yaml::to_string(self)?;
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, path)?;

        debug!("Saved ledger config to {:?}", path);
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.id_prefix.is_empty() {
            bail!("id_prefix cannot be empty");
        }
        if self.id_prefix.chars().any(|c| c.is_ascii_digit()) {
            bail!("id_prefix cannot contain digits: {}", self.id_prefix);
        }
        if !self.separator.is_ascii() || self.separator == '"' || self.separator == '\n' {
            bail!("separator must be a single ASCII character other than quote or newline");
        }
        if self.timestamp_format.trim().is_empty() {
            bail!("timestamp_format cannot be empty");
        }
        Ok(())
    }

    /// Storage reading and writing files with this configuration's separator
    pub fn storage(&self) -> CsvStorage {
        // validate() rejects non-ASCII separators
        CsvStorage::new(u8::try_from(self.separator).unwrap_or(DEFAULT_SEPARATOR))
    }

    /// Record id for the given sequence number, e.g. `Rec0007`
    pub fn format_id(&self, number: u64) -> String {
        format!("{}{:0width$}", self.id_prefix, number, width = self.id_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::TestEnvironment;

    #[test]
    fn test_load_creates_default_file() {
        let env = TestEnvironment::new().unwrap();
        let path = env.path("ledger.yaml");

        let config = LedgerConfig::load(&path).unwrap();
        assert_eq!(config, LedgerConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let env = TestEnvironment::new().unwrap();
        let path = env.write_file("ledger.yaml", "id_size: 6\nseparator: \",\"\n");

        let config = LedgerConfig::load(&path).unwrap();
        assert_eq!(config.id_size, 6);
        assert_eq!(config.separator, ',');
        assert_eq!(config.id_prefix, "Rec");
        assert_eq!(config.format_id(12), "Rec000012");
        assert_eq!(config.storage().separator(), b',');
    }

    #[test]
    fn test_invalid_prefix_is_rejected() {
        let env = TestEnvironment::new().unwrap();
        let path = env.write_file("ledger.yaml", "id_prefix: R2\n");
        assert!(LedgerConfig::load(&path).is_err());
    }

    #[test]
    fn test_save_round_trip() {
        let env = TestEnvironment::new().unwrap();
        let path = env.path("nested/ledger.yaml");
        let config = LedgerConfig {
            id_size: 3,
            id_prefix: "Bud".to_string(),
            ..LedgerConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(LedgerConfig::load(&path).unwrap(), config);
        assert_eq!(config.format_id(1), "Bud001");
    }
}
