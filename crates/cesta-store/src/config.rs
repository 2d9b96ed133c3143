use cesta_core::DayBoundary;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Budget offered when a trip does not name one.
pub const DEFAULT_BUDGET: Decimal = Decimal::ONE_HUNDRED;

/// Settings stored in `<root>/config.json`. Missing keys take defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Offset used to cut calendar days for price de-duplication.
    pub utc_offset: String,
    pub default_budget: Decimal,
    /// Symbol printed in front of amounts.
    pub currency: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            utc_offset: "Z".to_string(),
            default_budget: DEFAULT_BUDGET,
            currency: "$".to_string(),
        }
    }
}

impl StoreConfig {
    pub const KEYS: [&'static str; 3] = ["utc_offset", "default_budget", "currency"];

    /// Read config. Returns defaults if the file doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid config {}: {e}", path.display()))?;
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid config {}: {e}", path.display()))?;
        Ok(config)
    }

    /// Read config, logging and falling back to defaults on any failure.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "config unreadable, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        crate::write_atomic(path, json.as_bytes())
    }

    fn validate(&self) -> anyhow::Result<()> {
        self.day_boundary()?;
        if self.default_budget <= Decimal::ZERO {
            anyhow::bail!("default_budget must be positive, got {}", self.default_budget);
        }
        Ok(())
    }

    pub fn day_boundary(&self) -> anyhow::Result<DayBoundary> {
        Ok(DayBoundary::parse(&self.utc_offset)?)
    }

    /// Set a key from its string form, validating the value.
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "utc_offset" => {
                let boundary = DayBoundary::parse(value)?;
                self.utc_offset = boundary.to_string();
            }
            "default_budget" => {
                let budget: Decimal = value
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("default_budget must be a number, got {value:?}"))?;
                if budget <= Decimal::ZERO {
                    anyhow::bail!("default_budget must be positive, got {budget}");
                }
                self.default_budget = budget;
            }
            "currency" => self.currency = value.trim().to_string(),
            _ => anyhow::bail!(
                "unknown config key: {key}. Expected one of: {}",
                Self::KEYS.join(", ")
            ),
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "utc_offset" => Some(self.utc_offset.clone()),
            "default_budget" => Some(self.default_budget.to_string()),
            "currency" => Some(self.currency.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = StoreConfig::load(&tmp.path().join("config.json")).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.default_budget, Decimal::from(100));
        assert_eq!(config.day_boundary().unwrap(), DayBoundary::UTC);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{"utc_offset":"-03:00"}"#).unwrap();
        let config = StoreConfig::load(&path).unwrap();
        assert_eq!(config.utc_offset, "-03:00");
        assert_eq!(config.currency, "$");
    }

    #[test]
    fn invalid_offset_is_an_error_but_load_or_default_recovers() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{"utc_offset":"noon"}"#).unwrap();
        assert!(StoreConfig::load(&path).is_err());
        assert_eq!(StoreConfig::load_or_default(&path), StoreConfig::default());
    }

    #[test]
    fn non_positive_default_budget_is_rejected_on_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{"default_budget":"0"}"#).unwrap();
        let err = StoreConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("default_budget must be positive"));
        std::fs::write(&path, r#"{"default_budget":-5}"#).unwrap();
        assert!(StoreConfig::load(&path).is_err());
        assert_eq!(
            StoreConfig::load_or_default(&path).default_budget,
            DEFAULT_BUDGET
        );
    }

    #[test]
    fn set_validates_and_normalizes() {
        let mut config = StoreConfig::default();
        config.set("utc_offset", "+9").unwrap();
        assert_eq!(config.get("utc_offset").as_deref(), Some("+09:00"));
        config.set("default_budget", "250.00").unwrap();
        assert_eq!(config.get("default_budget").as_deref(), Some("250.00"));
        assert!(config.set("default_budget", "-1").is_err());
        assert!(config.set("default_budget", "lots").is_err());
        assert!(config.set("colour", "blue").is_err());
        assert!(config.get("colour").is_none());
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        let mut config = StoreConfig::default();
        config.set("currency", "R$").unwrap();
        config.save(&path).unwrap();
        assert_eq!(StoreConfig::load(&path).unwrap().currency, "R$");
    }
}
