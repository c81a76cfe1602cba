use std::path::{Path, PathBuf};

use otmde_core::validation::{VetoPolicy, codes};
use serde::Deserialize;

/// Editor settings loaded from `otmde.toml`. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub actions: ActionSettings,
    pub validation: ValidationSettings,
    pub log: LogSettings,
}

/// Undo queue behavior.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ActionSettings {
    /// Maximum number of undoable actions; `0` keeps all of them.
    pub max_undo: usize,
    /// Post a status warning when an action is vetoed.
    pub warn_on_veto: bool,
}

impl Default for ActionSettings {
    fn default() -> Self {
        Self {
            max_undo: 0,
            warn_on_veto: true,
        }
    }
}

/// Which validation findings veto an action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    pub veto_codes: Vec<String>,
}

impl ValidationSettings {
    pub fn veto_policy(&self) -> VetoPolicy {
        VetoPolicy::new(self.veto_codes.iter().cloned())
    }
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            veto_codes: [
                codes::NAME_REQUIRED,
                codes::INVALID_NAME,
                codes::DUPLICATE_NAME,
                codes::ILLEGAL_TYPE_ASSIGNMENT,
                codes::ABSTRACT_FIRST_CLASS,
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default `env_logger` filter, used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info".into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Load an editor config from a TOML file.
pub fn load_config(path: &Path) -> Result<EditorConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_owned(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_owned(),
        source,
    })
}

pub fn from_toml_str(content: &str) -> Result<EditorConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Load the config, falling back to defaults if the file is missing or
/// malformed.
pub fn load_or_default(path: &Path) -> EditorConfig {
    match load_config(path) {
        Ok(config) => {
            log::info!(
                "Loaded editor config: max_undo={}, {} veto codes",
                config.actions.max_undo,
                config.validation.veto_codes.len()
            );
            config
        }
        Err(e) => {
            log::warn!("No editor config ({e}), using defaults");
            EditorConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = from_toml_str("").unwrap();
        assert_eq!(config, EditorConfig::default());
        assert!(config.actions.warn_on_veto);
        assert_eq!(config.log.filter, "info");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = from_toml_str(
            r#"
            [actions]
            max_undo = 25

            [validation]
            veto_codes = ["NAME_REQUIRED"]
            "#,
        )
        .unwrap();
        assert_eq!(config.actions.max_undo, 25);
        assert!(config.actions.warn_on_veto);

        let policy = config.validation.veto_policy();
        assert!(policy.contains(codes::NAME_REQUIRED));
        assert!(!policy.contains(codes::DUPLICATE_NAME));
    }

    #[test]
    fn default_veto_codes_match_default_policy() {
        let policy = ValidationSettings::default().veto_policy();
        for code in [
            codes::NAME_REQUIRED,
            codes::INVALID_NAME,
            codes::DUPLICATE_NAME,
            codes::ILLEGAL_TYPE_ASSIGNMENT,
            codes::ABSTRACT_FIRST_CLASS,
        ] {
            assert!(policy.contains(code));
        }
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        assert!(from_toml_str("[actions]\nmax_undo = \"lots\"").is_err());
    }

    #[test]
    fn missing_file_falls_back() {
        let path = Path::new("/nonexistent/otmde/otmde.toml");
        assert!(matches!(load_config(path), Err(ConfigError::Io { .. })));
        assert_eq!(load_or_default(path), EditorConfig::default());
    }
}
