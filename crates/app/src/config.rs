use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use txscan_core::CategoryTaxonomy;
use txscan_import::{ProviderProfile, TextParser};
use txscan_pdf::{default_bank_patterns, BankIdentityTable, BankPattern, StatementParser, StatementTableParser};

pub const CONFIG_FILE: &str = "txscan.toml";

/// Contents of `txscan.toml`. Every section is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub categories: CategoryTaxonomy,
    pub banks: Vec<BankPattern>,
    pub providers: Vec<ProviderProfile>,
    pub enhancement: EnhancementSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancementSection {
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            categories: CategoryTaxonomy::default(),
            banks: default_bank_patterns(),
            providers: ProviderProfile::defaults(),
            enhancement: EnhancementSection::default(),
        }
    }
}

impl Default for EnhancementSection {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl EnhancementSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl AppConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content).context("parse txscan.toml")?;
        config.categories.validate().context("invalid [categories] section")?;
        Ok(config)
    }

    pub fn text_parser(&self) -> TextParser {
        TextParser::new(self.categories.clone(), self.providers.clone())
    }

    pub fn statement_parser(&self) -> Result<StatementParser> {
        let banks = BankIdentityTable::new(&self.banks).context("invalid [[banks]] entry")?;
        let table = StatementTableParser::new(Default::default(), self.categories.clone());
        Ok(StatementParser::new(table, banks))
    }
}

/// `<platform config dir>/txscan.toml`, if the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "txscan", "txscan").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Load from `explicit` when given (it must exist), otherwise from the
/// default location. A missing default file means built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => {
                tracing::debug!("no config file, using defaults");
                return Ok(AppConfig::default());
            }
        },
    };
    let content = std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    AppConfig::from_toml(&content).with_context(|| format!("load {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use txscan_core::SourceType;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(AppConfig::from_toml("").unwrap(), AppConfig::default());
    }

    #[test]
    fn sections_override_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [enhancement]
            timeout_secs = 5

            [[banks]]
            pattern = "acme\\s*bank"
            name = "Acme Bank"

            [[providers]]
            name = "ChipperCash"
            keywords = ["chipper"]
            default_merchant = "Chipper Cash"
            "#,
        )
        .unwrap();
        assert_eq!(config.enhancement.timeout(), Duration::from_secs(5));
        assert_eq!(config.banks, vec![BankPattern::new("acme\\s*bank", "Acme Bank")]);
        assert_eq!(config.providers.len(), 1);
        assert_eq!(config.categories, CategoryTaxonomy::default());

        let parser = config.text_parser();
        assert_eq!(parser.classify("Chipper payment of UGX 20,000"), SourceType::NamedReceipt);
    }

    #[test]
    fn bad_taxonomy_is_rejected() {
        let err = AppConfig::from_toml(
            r#"
            [categories]
            expense = ["Food"]
            default_expense = "Travel"
            "#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("[categories]"));
    }

    #[test]
    fn bad_bank_pattern_fails_at_construction() {
        let config = AppConfig::from_toml("[[banks]]\npattern = \"(unclosed\"\nname = \"X\"").unwrap();
        assert!(config.statement_parser().is_err());
    }

    #[test]
    fn explicit_path_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[enhancement]\ntimeout_secs = 12").unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.enhancement.timeout_secs, 12);
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("nope.toml"))).is_err());
    }
}
