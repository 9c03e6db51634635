use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};

pub const DEFAULT_REPLACEMENT: &str = "[REDACTED]";

/// One `(pattern, replacement)` substitution, as written in `config.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionRule {
    pub pattern: String,
    #[serde(default = "default_replacement")]
    pub replacement: String,
}

impl RedactionRule {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self { pattern: pattern.into(), replacement: replacement.into() }
    }
}

fn default_replacement() -> String {
    DEFAULT_REPLACEMENT.to_string()
}

/// Compiled rule list, applied in order
#[derive(Debug, Clone, Default)]
pub struct Redactor {
    rules: Vec<(Regex, String)>,
}

impl Redactor {
    pub fn new(rules: &[RedactionRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| {
                Regex::new(&rule.pattern)
                    .map(|re| (re, rule.replacement.clone()))
                    .map_err(|source| VaultError::InvalidRedactionPattern {
                        pattern: rule.pattern.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Replace every match of each rule, feeding each rule's output into the next
    pub fn apply(&self, text: &str) -> String {
        let mut result = text.to_string();
        for (regex, replacement) in &self.rules {
            result = regex.replace_all(&result, replacement.as_str()).into_owned();
        }
        result
    }
}
