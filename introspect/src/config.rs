//! Tool configuration for form generation.
//!
//! All fields are optional in the file; missing ones take their defaults.
//!
//! # Example YAML
//!
//! ```yaml
//! ignore_commands:
//!   - tui
//!   - completions
//! render:
//!   max_count: 3
//!   missing_marker: "<missing>"
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use cmdform_core::RenderConfig;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Command launching the form itself, excluded from generated schemas.
pub const DEFAULT_IGNORED_COMMAND: &str = "tui";

/// Top-level configuration.
///
/// # Examples
///
/// ```
/// use cmdform_introspect::FormConfig;
///
/// let config: FormConfig = serde_yaml::from_str("render: { max_count: 2 }").unwrap();
/// assert_eq!(config.render.max_count, 2);
/// assert_eq!(config.render.missing_marker, "???");
/// assert!(config.is_ignored("tui"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Command names left out at every level of the tree.
    pub ignore_commands: Vec<String>,
    /// Reconstruction settings.
    pub render: RenderConfig,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            ignore_commands: vec![DEFAULT_IGNORED_COMMAND.to_string()],
            render: RenderConfig::default(),
        }
    }
}

impl FormConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::IntrospectError::Io) if the file cannot be
    /// read, or [`Yaml`](crate::IntrospectError::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::IntrospectError::Io) if the file cannot be
    /// written, or [`Yaml`](crate::IntrospectError::Yaml) if serialization
    /// fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Returns `true` if `command` is excluded from schemas.
    pub fn is_ignored(&self, command: &str) -> bool {
        self.ignore_commands.iter().any(|c| c == command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_complete() {
        let config: FormConfig = serde_yaml::from_str(
            r#"
ignore_commands: [tui, completions]
render:
  max_count: 3
  missing_marker: "<missing>"
"#,
        )
        .unwrap();
        assert_eq!(config.ignore_commands, vec!["tui", "completions"]);
        assert_eq!(config.render.max_count, 3);
        assert_eq!(config.render.missing_marker, "<missing>");
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: FormConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, FormConfig::default());
    }

    #[test]
    fn test_roundtrip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmdform.yml");

        let mut config = FormConfig::default();
        config.ignore_commands.push("shell".to_string());
        config.save(&path).unwrap();

        let loaded = FormConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(loaded.is_ignored("shell"));
        assert!(!loaded.is_ignored("deploy"));
    }
}
