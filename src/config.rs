//! Engine configuration
//!
//! Loaded in layers:
//! 1. Default values in code
//! 2. An optional `config/fabrication.toml` file
//! 3. Environment variable overrides with the `FABRICATION` prefix, e.g.
//!    `FABRICATION__PRICING__PER_UNIT_WASTE=true`

use config::{Environment, File};
use serde::Deserialize;

use crate::pricing::PricingOptions;
use crate::types::CoreResult;

/// Main engine configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub pricing: PricingConfig,

    #[serde(default)]
    pub ledger: LedgerConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PricingConfig {
    /// Decimals kept when areas are displayed
    pub area_display_decimals: u32,

    /// Bill per-unit items for their nominal waste price
    pub per_unit_waste: bool,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LedgerConfig {
    /// Longest accepted entry description under strict validation
    pub max_description_len: usize,

    /// Use the strict entry validator instead of the default one
    pub strict_validation: bool,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            area_display_decimals: 2,
            per_unit_waste: false,
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_description_len: 500,
            strict_validation: false,
        }
    }
}

impl EngineConfig {
    /// Load configuration from `config/fabrication.toml` and the environment
    pub fn load() -> CoreResult<Self> {
        Self::load_from("config/fabrication")
    }

    /// Load configuration from the given file stem and the environment
    pub fn load_from(path: &str) -> CoreResult<Self> {
        let config = config::Config::builder()
            .set_default("pricing.area_display_decimals", 2)?
            .set_default("pricing.per_unit_waste", false)?
            .set_default("ledger.max_description_len", 500)?
            .set_default("ledger.strict_validation", false)?
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("FABRICATION")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: EngineConfig = config.try_deserialize()?;
        tracing::debug!(config = ?loaded, "Engine configuration loaded");
        Ok(loaded)
    }

    /// Pricing options derived from the `pricing` section
    pub fn pricing_options(&self) -> PricingOptions {
        PricingOptions {
            per_unit_waste: self.pricing.per_unit_waste,
            area_display_decimals: self.pricing.area_display_decimals,
        }
    }
}
