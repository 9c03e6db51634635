//! User configuration stored as `<vault>/config.json`
//!
//! Every field has a default, so a partial file is fine. A file that cannot be read,
//! parsed or validated is ignored as a whole in favour of the defaults.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};
use crate::render::RedactionRule;
use crate::store::{KeyedStore, StoreKey};

pub const CONFIG_FILENAME: &str = "config.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Md,
    Json,
    Html,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Md => "md",
            ExportFormat::Json => "json",
            ExportFormat::Html => "html",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "md" | "markdown" => Ok(ExportFormat::Md),
            "json" => Ok(ExportFormat::Json),
            "html" => Ok(ExportFormat::Html),
            _ => Err(VaultError::UnsupportedExportFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub auto_save: bool,
    /// Auto-save skips transcripts with fewer messages than this
    pub auto_save_min_messages: usize,
    pub max_transcript_size_mb: f64,
    pub redaction_rules: Vec<RedactionRule>,
    pub default_export_format: ExportFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_save: false,
            auto_save_min_messages: 5,
            max_transcript_size_mb: 10.0,
            redaction_rules: Vec::new(),
            default_export_format: ExportFormat::Md,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.auto_save_min_messages < 1 {
            return Err(VaultError::InvalidConfig(
                "auto_save_min_messages must be at least 1".to_string(),
            ));
        }
        if !(self.max_transcript_size_mb.is_finite() && self.max_transcript_size_mb > 0.0) {
            return Err(VaultError::InvalidConfig(format!(
                "max_transcript_size_mb must be positive, got {}",
                self.max_transcript_size_mb
            )));
        }
        Ok(())
    }

    /// Set one field from its textual form, as given on the command line
    ///
    /// `redaction_rules` takes a JSON array of `{pattern, replacement?}` objects. The
    /// result is validated; on error `self` is left unchanged.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = |expected: &str| {
            VaultError::InvalidConfig(format!("{} expects {}, got '{}'", key, expected, value))
        };

        let mut updated = self.clone();
        match key {
            "auto_save" => updated.auto_save = value.parse().map_err(|_| invalid("true or false"))?,
            "auto_save_min_messages" => {
                updated.auto_save_min_messages =
                    value.parse().map_err(|_| invalid("a positive integer"))?;
            }
            "max_transcript_size_mb" => {
                updated.max_transcript_size_mb = value.parse().map_err(|_| invalid("a number"))?;
            }
            "redaction_rules" => {
                updated.redaction_rules =
                    serde_json::from_str(value).map_err(|_| invalid("a JSON array of rules"))?;
            }
            "default_export_format" => updated.default_export_format = value.parse()?,
            _ => return Err(VaultError::InvalidConfig(format!("unknown config key '{}'", key))),
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

/// Load the vault's config, falling back to defaults when it is missing or invalid
pub fn load_config<S: KeyedStore>(store: &S) -> Config {
    match try_load_config(store) {
        Ok(Some(config)) => config,
        Ok(None) => Config::default(),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring invalid config, using defaults");
            Config::default()
        }
    }
}

fn try_load_config<S: KeyedStore>(store: &S) -> Result<Option<Config>> {
    let bytes = match store.get(&StoreKey::root(CONFIG_FILENAME)) {
        Ok(bytes) => bytes,
        Err(e) if e.is_not_found() => return Ok(None),
        Err(e) => return Err(e),
    };
    let config: Config =
        serde_json::from_slice(&bytes).map_err(|e| VaultError::json("parse config", e))?;
    config.validate()?;
    Ok(Some(config))
}

/// Validate and persist a config
pub fn save_config<S: KeyedStore>(store: &S, config: &Config) -> Result<()> {
    config.validate()?;
    let json =
        serde_json::to_string_pretty(config).map_err(|e| VaultError::json("serialize config", e))?;
    store.put(&StoreKey::root(CONFIG_FILENAME), json.as_bytes())
}
