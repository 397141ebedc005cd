//! Engine tunables, loaded from TOML by the CLI.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// How many leading pages the layout classifier inspects.
    pub classifier_pages: usize,
    /// Documents averaging fewer non-whitespace characters per page are image-only.
    pub min_chars_per_page: usize,
    /// Guess a reference from `*`-prefixed or long numeric tokens when no
    /// `Referencia` anchor exists. Off by default.
    pub reference_fallback: bool,
    /// Year used to type `DD/MMM` dates on export.
    pub statement_year: Option<i32>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            classifier_pages: 3,
            min_chars_per_page: 50,
            reference_fallback: false,
            statement_year: None,
        }
    }
}

impl ExtractorConfig {
    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).context("parse extractor config")
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serialize extractor config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg = ExtractorConfig::from_toml("reference_fallback = true\nstatement_year = 2025\n").unwrap();
        assert!(cfg.reference_fallback);
        assert_eq!(cfg.statement_year, Some(2025));
        assert_eq!(cfg.classifier_pages, 3);
        assert_eq!(cfg.min_chars_per_page, 50);
    }

    #[test]
    fn test_default_round_trips() {
        let cfg = ExtractorConfig::default();
        let s = cfg.to_toml().unwrap();
        assert_eq!(ExtractorConfig::from_toml(&s).unwrap(), cfg);
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        assert!(ExtractorConfig::from_toml("classifier_pages = \"three\"").is_err());
    }
}
