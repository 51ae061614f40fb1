//! Supply settings: per-resource rates and the capacity multiplier.
//!
//! Rates are per-second quantities for a single crew member on EVA.
//! Consumables (electricity, food, water, oxygen) are consumption rates;
//! waste products (CO2, waste, waste water) are production rates. A pool's
//! capacity is `rate × multiplier`, i.e. the multiplier is the number of
//! seconds the unit can stay out before a pool is full or empty.
//!
//! ```
//! use evasupply_logic::resources::TrackedResource;
//! use evasupply_logic::settings::SupplySettings;
//!
//! let settings = SupplySettings::default();
//! assert!(settings.validate().is_ok());
//! let o2 = settings.capacity(TrackedResource::Oxygen);
//! assert!(o2 > 0.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::resources::TrackedResource;

/// Default EVA buffer: one day of supply.
pub const DEFAULT_MULTIPLIER: f64 = 86_400.0;

/// Configured rate for each tracked resource.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceRates {
    pub electricity: f64,
    pub food: f64,
    pub water: f64,
    pub oxygen: f64,
    pub co2: f64,
    pub waste: f64,
    pub waste_water: f64,
}

impl Default for ResourceRates {
    fn default() -> Self {
        Self {
            electricity: 0.014_166_666_666_7,
            food: 0.000_016_927_083_333,
            water: 0.000_011_188_078_704,
            oxygen: 0.001_713_537_562_385,
            co2: 0.001_480_128_898_760,
            waste: 0.000_001_539_351_852,
            waste_water: 0.000_014_247_685_185,
        }
    }
}

impl ResourceRates {
    pub fn rate(&self, kind: TrackedResource) -> f64 {
        match kind {
            TrackedResource::Electricity => self.electricity,
            TrackedResource::Food => self.food,
            TrackedResource::Water => self.water,
            TrackedResource::Oxygen => self.oxygen,
            TrackedResource::CarbonDioxide => self.co2,
            TrackedResource::Waste => self.waste,
            TrackedResource::WasteWater => self.waste_water,
        }
    }

    pub fn set_rate(&mut self, kind: TrackedResource, value: f64) {
        let slot = match kind {
            TrackedResource::Electricity => &mut self.electricity,
            TrackedResource::Food => &mut self.food,
            TrackedResource::Water => &mut self.water,
            TrackedResource::Oxygen => &mut self.oxygen,
            TrackedResource::CarbonDioxide => &mut self.co2,
            TrackedResource::Waste => &mut self.waste,
            TrackedResource::WasteWater => &mut self.waste_water,
        };
        *slot = value;
    }

    /// Same rate for every resource. Handy for tests and fixtures.
    pub fn uniform(value: f64) -> Self {
        Self {
            electricity: value,
            food: value,
            water: value,
            oxygen: value,
            co2: value,
            waste: value,
            waste_water: value,
        }
    }
}

/// Rates plus the shared capacity multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupplySettings {
    pub rates: ResourceRates,
    pub multiplier: f64,
}

impl Default for SupplySettings {
    fn default() -> Self {
        Self {
            rates: ResourceRates::default(),
            multiplier: DEFAULT_MULTIPLIER,
        }
    }
}

impl SupplySettings {
    /// Reject settings that would write non-finite or inverted capacities.
    ///
    /// Negative rates are allowed but logged, since they produce
    /// negative capacities.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for kind in TrackedResource::ALL {
            let value = self.rates.rate(kind);
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteRate {
                    resource: kind,
                    value,
                });
            }
            if value < 0.0 {
                log::warn!(
                    "{} rate is negative ({}); its pool capacity will be negative",
                    kind,
                    value
                );
            }
        }
        if !self.multiplier.is_finite() || self.multiplier < 0.0 {
            return Err(ConfigError::InvalidMultiplier(self.multiplier));
        }
        Ok(())
    }

    /// Parse and validate settings from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: SupplySettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn rate(&self, kind: TrackedResource) -> f64 {
        self.rates.rate(kind)
    }

    /// Pool capacity for `kind`: `rate × multiplier`.
    pub fn capacity(&self, kind: TrackedResource) -> f64 {
        self.rate(kind) * self.multiplier
    }
}

/// Source of the current supply settings.
///
/// Returns `None` when the host has no active session, in which case
/// there are no settings to apply yet.
pub trait ConfigSource {
    fn supply(&self) -> Option<SupplySettings>;
}

/// Fixed settings, e.g. loaded once from a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticConfig {
    pub supply: Option<SupplySettings>,
}

impl StaticConfig {
    pub fn active(supply: SupplySettings) -> Self {
        Self {
            supply: Some(supply),
        }
    }

    /// No session loaded.
    pub fn inactive() -> Self {
        Self { supply: None }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: StaticConfig = serde_json::from_str(json)?;
        if let Some(supply) = &config.supply {
            supply.validate()?;
        }
        Ok(config)
    }
}

impl ConfigSource for StaticConfig {
    fn supply(&self) -> Option<SupplySettings> {
        self.supply
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_valid() {
        assert!(SupplySettings::default().validate().is_ok());
    }

    #[test]
    fn test_capacity_is_rate_times_multiplier() {
        let mut settings = SupplySettings {
            rates: ResourceRates::uniform(0.0),
            multiplier: 3600.0,
        };
        settings.rates.set_rate(TrackedResource::Oxygen, 0.02);
        assert!((settings.capacity(TrackedResource::Oxygen) - 72.0).abs() < 1e-9);
        assert_eq!(settings.capacity(TrackedResource::Food), 0.0);
    }

    #[test]
    fn test_set_rate_targets_one_field() {
        let mut rates = ResourceRates::uniform(1.0);
        rates.set_rate(TrackedResource::WasteWater, 5.0);
        for kind in TrackedResource::ALL {
            let expected = if kind == TrackedResource::WasteWater {
                5.0
            } else {
                1.0
            };
            assert_eq!(rates.rate(kind), expected, "{kind}");
        }
    }

    #[test]
    fn test_non_finite_rate_rejected() {
        let mut settings = SupplySettings::default();
        settings.rates.water = f64::NAN;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::NonFiniteRate {
                resource: TrackedResource::Water,
                ..
            })
        ));
    }

    #[test]
    fn test_negative_multiplier_rejected() {
        let settings = SupplySettings {
            multiplier: -1.0,
            ..SupplySettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidMultiplier(_))
        ));
    }

    #[test]
    fn test_zero_multiplier_allowed() {
        let settings = SupplySettings {
            multiplier: 0.0,
            ..SupplySettings::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_negative_rate_allowed() {
        let mut settings = SupplySettings::default();
        settings.rates.co2 = -0.001;
        assert!(settings.validate().is_ok());
        assert!(settings.capacity(TrackedResource::CarbonDioxide) < 0.0);
    }

    #[test]
    fn test_static_config_from_json() {
        let json = r#"{
            "supply": {
                "rates": {
                    "electricity": 0.01, "food": 0.02, "water": 0.03, "oxygen": 0.04,
                    "co2": 0.05, "waste": 0.06, "waste_water": 0.07
                },
                "multiplier": 100.0
            }
        }"#;
        let config = StaticConfig::from_json(json).unwrap();
        let supply = config.supply().unwrap();
        assert_eq!(supply.multiplier, 100.0);
        assert_eq!(supply.rate(TrackedResource::WasteWater), 0.07);
    }

    #[test]
    fn test_static_config_without_session() {
        let config = StaticConfig::from_json(r#"{"supply": null}"#).unwrap();
        assert!(config.supply().is_none());
        assert!(StaticConfig::inactive().supply().is_none());
    }

    #[test]
    fn test_static_config_validates_supply() {
        let json = r#"{"supply": {"rates": {
            "electricity": 0.0, "food": 0.0, "water": 0.0, "oxygen": 0.0,
            "co2": 0.0, "waste": 0.0, "waste_water": 0.0}, "multiplier": -5.0}}"#;
        assert!(StaticConfig::from_json(json).is_err());
    }
}
