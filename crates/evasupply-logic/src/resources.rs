//! Tracked life support resources and their canonical host names.
//!
//! The host identifies resources by string. Those strings are resolved
//! once at startup into a [`ResourceNames`] table keyed by the closed
//! [`TrackedResource`] enum, so every later lookup is a typed match
//! instead of a string comparison.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The seven resources carried by an EVA unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum TrackedResource {
    Electricity = 0,
    Food = 1,
    Water = 2,
    Oxygen = 3,
    CarbonDioxide = 4,
    Waste = 5,
    WasteWater = 6,
}

impl TrackedResource {
    /// All tracked resources, in provisioning order.
    pub const ALL: [TrackedResource; 7] = [
        Self::Electricity,
        Self::Food,
        Self::Water,
        Self::Oxygen,
        Self::CarbonDioxide,
        Self::Waste,
        Self::WasteWater,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Electricity => "Electricity",
            Self::Food => "Food",
            Self::Water => "Water",
            Self::Oxygen => "Oxygen",
            Self::CarbonDioxide => "CO2",
            Self::Waste => "Waste",
            Self::WasteWater => "Waste Water",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for TrackedResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw name table as it appears in configuration files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceNameConfig {
    pub electricity: String,
    pub food: String,
    pub water: String,
    pub oxygen: String,
    pub co2: String,
    pub waste: String,
    pub waste_water: String,
}

impl Default for ResourceNameConfig {
    fn default() -> Self {
        Self {
            electricity: "ElectricCharge".to_string(),
            food: "Food".to_string(),
            water: "Water".to_string(),
            oxygen: "Oxygen".to_string(),
            co2: "CarbonDioxide".to_string(),
            waste: "Waste".to_string(),
            waste_water: "WasteWater".to_string(),
        }
    }
}

/// Validated canonical name for every tracked resource.
///
/// Immutable once built; construct it at startup and share it by
/// reference for the rest of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceNames {
    names: [String; 7],
}

impl ResourceNames {
    /// Validate a raw name table.
    ///
    /// Names are trimmed. Every name must be non-empty and the seven names
    /// must be distinct, otherwise two resources would share one pool.
    pub fn new(config: ResourceNameConfig) -> Result<Self, ConfigError> {
        let names = [
            config.electricity,
            config.food,
            config.water,
            config.oxygen,
            config.co2,
            config.waste,
            config.waste_water,
        ]
        .map(|n| n.trim().to_string());

        for (kind, name) in TrackedResource::ALL.iter().zip(names.iter()) {
            if name.is_empty() {
                return Err(ConfigError::EmptyName(*kind));
            }
        }
        for (i, name) in names.iter().enumerate() {
            if let Some(j) = names[i + 1..].iter().position(|other| other == name) {
                return Err(ConfigError::DuplicateName {
                    name: name.clone(),
                    first: TrackedResource::ALL[i],
                    second: TrackedResource::ALL[i + 1 + j],
                });
            }
        }

        Ok(Self { names })
    }

    /// Parse and validate a JSON name table.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ResourceNameConfig = serde_json::from_str(json)?;
        Self::new(config)
    }

    pub fn name(&self, kind: TrackedResource) -> &str {
        &self.names[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (TrackedResource, &str)> {
        TrackedResource::ALL
            .iter()
            .map(move |kind| (*kind, self.name(*kind)))
    }
}

impl Default for ResourceNames {
    fn default() -> Self {
        let c = ResourceNameConfig::default();
        Self {
            names: [
                c.electricity,
                c.food,
                c.water,
                c.oxygen,
                c.co2,
                c.waste,
                c.waste_water,
            ],
        }
    }
}
