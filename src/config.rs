//! Document layout: where the two marketplace sections live and how they
//! are labelled in `total_metrics.market_note`.

use std::env;

pub const DEFAULT_PRIMARY_KEY: &str = "metrics";
pub const DEFAULT_SECONDARY_KEY: &str = "wb_metrics";
pub const DEFAULT_PRIMARY_LABEL: &str = "Ozon";
pub const DEFAULT_SECONDARY_LABEL: &str = "WB";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketLayout {
    pub primary_key: String,
    pub secondary_key: String,
    pub primary_label: String,
    pub secondary_label: String,
}

impl Default for MarketLayout {
    fn default() -> Self {
        Self {
            primary_key: DEFAULT_PRIMARY_KEY.to_string(),
            secondary_key: DEFAULT_SECONDARY_KEY.to_string(),
            primary_label: DEFAULT_PRIMARY_LABEL.to_string(),
            secondary_label: DEFAULT_SECONDARY_LABEL.to_string(),
        }
    }
}

impl MarketLayout {
    /// Reads `LANDING_PRIMARY_KEY`, `LANDING_SECONDARY_KEY`,
    /// `LANDING_PRIMARY_LABEL` and `LANDING_SECONDARY_LABEL`, falling back
    /// to the defaults for unset or blank variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let pick = |name: &str, default: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            primary_key: pick("LANDING_PRIMARY_KEY", DEFAULT_PRIMARY_KEY),
            secondary_key: pick("LANDING_SECONDARY_KEY", DEFAULT_SECONDARY_KEY),
            primary_label: pick("LANDING_PRIMARY_LABEL", DEFAULT_PRIMARY_LABEL),
            secondary_label: pick("LANDING_SECONDARY_LABEL", DEFAULT_SECONDARY_LABEL),
        }
    }

    /// Label used when the secondary marketplace contributes to the totals.
    pub fn combined_label(&self) -> String {
        format!("{} + {}", self.primary_label, self.secondary_label)
    }
}
