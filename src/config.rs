//! @dose
//! purpose: Settings for parsing, building and printing comments, read from docblock.toml.
//!     Covers the type dialect, the comment-to-declaration line gap, type rendering and the
//!     tokenization policy.
//!
//! when-editing:
//!     - !Every field has a default, a partial file only overrides what it names
//!     - !Keys are kebab-case in TOML (`prefer-raw-type`, `[tokenizers] no-types`)
//!
//! invariants:
//!     - Settings::load returns defaults if docblock.toml doesn't exist
//!     - Settings::load never fails; read and parse errors are logged and defaults used
//!
//! gotchas:
//!     - Setting `no-types` or `no-names` replaces the default list rather than extending it

use crate::formatter::StringifyOptions;
use crate::parser::tokenizers::TokenizationPolicy;
use crate::tree::BuildOptions;
use crate::type_expr::ParseMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

pub const CONFIG_FILE: &str = "docblock.toml";

/// Main configuration structure matching docblock.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// Type dialect used when parsing tag types
    pub mode: ParseMode,

    /// Minimum blank-line gap between a doc comment and its declaration
    pub min_lines: usize,

    /// Maximum blank-line gap between a doc comment and its declaration
    pub max_lines: usize,

    /// Print tag types from their source lines instead of the parsed type
    pub prefer_raw_type: bool,

    /// Fail the build on a type that does not parse
    pub throw_on_type_parsing_errors: bool,

    /// Tags that skip type or name splitting
    pub tokenizers: TokenizationPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: ParseMode::default(),
            min_lines: 0,
            max_lines: 1,
            prefer_raw_type: false,
            throw_on_type_parsing_errors: false,
            tokenizers: TokenizationPolicy::default(),
        }
    }
}

impl Settings {
    /// Load settings from docblock.toml in the given root directory
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);

        if !config_path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&config_path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!(path = %config_path.display(), error = %e, "failed to parse settings");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %config_path.display(), error = %e, "failed to read settings");
                Self::default()
            }
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            mode: self.mode,
            throw_on_type_parsing_errors: self.throw_on_type_parsing_errors,
        }
    }

    pub fn stringify_options(&self) -> StringifyOptions {
        StringifyOptions {
            prefer_raw_type: self.prefer_raw_type,
        }
    }

    pub fn tokenization_policy(&self) -> &TokenizationPolicy {
        &self.tokenizers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.mode, ParseMode::Typescript);
        assert_eq!(settings.min_lines, 0);
        assert_eq!(settings.max_lines, 1);
        assert!(!settings.prefer_raw_type);
        assert!(settings.tokenizers.no_types.contains(&"example".to_string()));
        assert!(settings.tokenizers.no_names.contains(&"returns".to_string()));
    }

    #[test]
    fn test_load_missing_settings() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load(temp_dir.path());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_basic_settings() {
        let temp_dir = TempDir::new().unwrap();
        let content = r#"
mode = "closure"
max-lines = 3
prefer-raw-type = true
"#;
        fs::write(temp_dir.path().join(CONFIG_FILE), content).unwrap();

        let settings = Settings::load(temp_dir.path());
        assert_eq!(settings.mode, ParseMode::Closure);
        assert_eq!(settings.min_lines, 0);
        assert_eq!(settings.max_lines, 3);
        assert!(settings.prefer_raw_type);
        assert_eq!(settings.tokenizers, TokenizationPolicy::default());
    }

    #[test]
    fn test_load_tokenizer_lists() {
        let temp_dir = TempDir::new().unwrap();
        let content = r#"
[tokenizers]
no-types = ["example"]
no-names = ["returns", "see"]
"#;
        fs::write(temp_dir.path().join(CONFIG_FILE), content).unwrap();

        let settings = Settings::load(temp_dir.path());
        assert_eq!(settings.tokenizers.no_types, vec!["example"]);
        assert_eq!(settings.tokenizers.no_names, vec!["returns", "see"]);
    }

    #[test]
    fn test_invalid_settings_fall_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE), "mode = \"python\"\n").unwrap();

        assert_eq!(Settings::load(temp_dir.path()), Settings::default());
        assert!(Settings::from_toml_str("mode = \"python\"\n").is_err());
    }

    #[test]
    fn test_option_conversions() {
        let settings = Settings {
            mode: ParseMode::Jsdoc,
            prefer_raw_type: true,
            throw_on_type_parsing_errors: true,
            ..Settings::default()
        };
        assert_eq!(
            settings.build_options(),
            BuildOptions {
                mode: ParseMode::Jsdoc,
                throw_on_type_parsing_errors: true,
            }
        );
        assert!(settings.stringify_options().prefer_raw_type);
        assert_eq!(settings.tokenization_policy(), &TokenizationPolicy::default());
    }
}
