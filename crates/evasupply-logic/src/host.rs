//! Interfaces to the host's template catalog.
//!
//! The host owns templates; this crate only mutates their resource pools
//! and module lists through [`TemplateBody`]. Primitives report failures
//! as a typed [`HostError`] so callers can tell an expected absence from a
//! genuine fault without inspecting messages.

use serde::{Deserialize, Serialize};

use crate::error::HostError;

/// Direction resources may flow out of / into a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowMode {
    In,
    Out,
    Both,
}

/// Named capacity + amount container on a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourcePool {
    pub name: String,
    pub capacity: f64,
    pub amount: f64,
    pub tweakable: bool,
    pub flow_enabled: bool,
    pub flow_mode: FlowMode,
}

/// Capability implemented by an attached module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    LifeSupport,
    Other(String),
}

/// Minimal description of a module to attach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub name: String,
    pub module_name: String,
    pub capability: Capability,
}

impl ModuleDescriptor {
    pub const LIFE_SUPPORT_NAME: &'static str = "LifeSupportModule";

    pub fn life_support() -> Self {
        Self {
            name: Self::LIFE_SUPPORT_NAME.to_string(),
            module_name: Self::LIFE_SUPPORT_NAME.to_string(),
            capability: Capability::LifeSupport,
        }
    }
}

/// Instantiable body of a template.
pub trait TemplateBody {
    /// Whether the template carries a resource container at all.
    fn has_resource_container(&self) -> bool;

    /// Whether the resource container and its simulation shadow are both
    /// initialised and usable.
    fn containers_valid(&self) -> bool;

    /// Initialise the resource container and its simulation shadow.
    fn setup_containers(&mut self) -> Result<(), HostError>;

    fn has_module(&self, capability: &Capability) -> bool;
    fn add_module(&mut self, module: ModuleDescriptor) -> Result<(), HostError>;

    fn pool(&self, name: &str) -> Option<ResourcePool>;
    fn pools(&self) -> Vec<ResourcePool>;

    /// Remove every pool named like `pool` and add `pool` in their place.
    ///
    /// All or nothing: on `Err` the template's pools are exactly as they
    /// were before the call.
    fn replace_pool(&mut self, pool: ResourcePool) -> Result<(), HostError>;
}

/// One catalog slot: identifier plus optional instantiable body.
pub struct TemplateEntry<'a> {
    pub identifier: &'a str,
    pub body: Option<&'a mut dyn TemplateBody>,
}

/// Host template catalog.
pub trait TemplateCatalog {
    /// All entries, mutably, in a deterministic order.
    fn entries_mut(&mut self) -> Box<dyn Iterator<Item = TemplateEntry<'_>> + '_>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_life_support_descriptor() {
        let m = ModuleDescriptor::life_support();
        assert_eq!(m.name, "LifeSupportModule");
        assert_eq!(m.module_name, m.name);
        assert_eq!(m.capability, Capability::LifeSupport);
    }

    #[test]
    fn test_pool_json_shape() {
        let pool = ResourcePool {
            name: "Oxygen".to_string(),
            capacity: 72.0,
            amount: 0.0,
            tweakable: false,
            flow_enabled: true,
            flow_mode: FlowMode::Both,
        };
        let json = serde_json::to_string(&pool).unwrap();
        assert!(json.contains(r#""flow_mode":"Both""#), "{json}");
    }
}
