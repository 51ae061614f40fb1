//! In-memory host: a plain-data implementation of the catalog traits.
//!
//! Used by the tests and the headless harness in place of a real engine.
//! A [`FaultPlan`] lets a template simulate the host's degraded contexts
//! (containers that cannot be built) and genuine faults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, HostError};
use crate::host::{
    Capability, ModuleDescriptor, ResourcePool, TemplateBody, TemplateCatalog, TemplateEntry,
};

/// Host failures to inject into a template's primitives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaultPlan {
    /// Returned by every `add_module`.
    pub module_add: Option<HostError>,
    /// Returned by `setup_containers`.
    pub setup: Option<HostError>,
    /// Returned by every pool write, whatever the name.
    pub pools: Option<HostError>,
    /// Returned when writing the named resource.
    pub pool_write: BTreeMap<String, HostError>,
    /// Each pool fault fires once and is then cleared.
    pub transient: bool,
}

impl FaultPlan {
    /// A prefab-only context: nothing can actually be constructed.
    pub fn headless() -> Self {
        Self {
            module_add: Some(HostError::ContainerUnavailable),
            pools: Some(HostError::ContainerUnavailable),
            ..Self::default()
        }
    }

    fn blanket_fault(&mut self) -> Option<HostError> {
        if self.transient {
            self.pools.take()
        } else {
            self.pools.clone()
        }
    }

    fn pool_fault(&mut self, name: &str) -> Option<HostError> {
        let named = if self.transient {
            self.pool_write.remove(name)
        } else {
            self.pool_write.get(name).cloned()
        };
        named.or_else(|| self.blanket_fault())
    }
}

/// Template body backed by vectors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryTemplate {
    /// `None` when the template has no resource container.
    pub resources: Option<Vec<ResourcePool>>,
    /// Whether the container and its simulation shadow are initialised.
    pub initialized: bool,
    pub modules: Vec<ModuleDescriptor>,
    pub faults: FaultPlan,
    /// Number of successful `setup_containers` calls.
    pub setup_count: u32,
}

impl MemoryTemplate {
    /// Template with an initialised, empty resource container.
    pub fn ready() -> Self {
        Self {
            resources: Some(Vec::new()),
            initialized: true,
            ..Self::default()
        }
    }

    /// Template whose container exists but has not been set up yet.
    pub fn uninitialized() -> Self {
        Self {
            resources: Some(Vec::new()),
            initialized: false,
            ..Self::default()
        }
    }

    /// Template with no resource container at all.
    pub fn without_container() -> Self {
        Self::default()
    }

    pub fn with_faults(mut self, faults: FaultPlan) -> Self {
        self.faults = faults;
        self
    }

    pub fn with_pool(mut self, pool: ResourcePool) -> Self {
        self.resources.get_or_insert_with(Vec::new).push(pool);
        self
    }

    pub fn with_module(mut self, module: ModuleDescriptor) -> Self {
        self.modules.push(module);
        self
    }

    /// Number of pools called `name` (more than one is a defect).
    pub fn pool_count(&self, name: &str) -> usize {
        self.resources
            .as_ref()
            .map(|pools| pools.iter().filter(|p| p.name == name).count())
            .unwrap_or(0)
    }

    pub fn module_count(&self, capability: &Capability) -> usize {
        self.modules
            .iter()
            .filter(|m| &m.capability == capability)
            .count()
    }

    fn ready_pools(&mut self) -> Result<&mut Vec<ResourcePool>, HostError> {
        if !self.initialized {
            return Err(HostError::ContainerUnavailable);
        }
        self.resources.as_mut().ok_or(HostError::ContainerUnavailable)
    }
}

impl TemplateBody for MemoryTemplate {
    fn has_resource_container(&self) -> bool {
        self.resources.is_some()
    }

    fn containers_valid(&self) -> bool {
        self.resources.is_some() && self.initialized
    }

    fn setup_containers(&mut self) -> Result<(), HostError> {
        if let Some(err) = &self.faults.setup {
            return Err(err.clone());
        }
        self.resources.get_or_insert_with(Vec::new);
        self.initialized = true;
        self.setup_count += 1;
        Ok(())
    }

    fn has_module(&self, capability: &Capability) -> bool {
        self.modules.iter().any(|m| &m.capability == capability)
    }

    fn add_module(&mut self, module: ModuleDescriptor) -> Result<(), HostError> {
        if let Some(err) = &self.faults.module_add {
            return Err(err.clone());
        }
        self.modules.push(module);
        Ok(())
    }

    fn pool(&self, name: &str) -> Option<ResourcePool> {
        self.resources
            .as_ref()?
            .iter()
            .find(|p| p.name == name)
            .cloned()
    }

    fn pools(&self) -> Vec<ResourcePool> {
        self.resources.clone().unwrap_or_default()
    }

    fn replace_pool(&mut self, pool: ResourcePool) -> Result<(), HostError> {
        if let Some(err) = self.faults.pool_fault(&pool.name) {
            return Err(err);
        }
        let pools = self.ready_pools()?;
        pools.retain(|p| p.name != pool.name);
        pools.push(pool);
        Ok(())
    }
}

/// One catalog slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub identifier: String,
    #[serde(default)]
    pub body: Option<MemoryTemplate>,
}

/// Ordered in-memory catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryCatalog {
    pub entries: Vec<MemoryEntry>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn push(&mut self, identifier: impl Into<String>, body: Option<MemoryTemplate>) {
        self.entries.push(MemoryEntry {
            identifier: identifier.into(),
            body,
        });
    }

    pub fn with(mut self, identifier: impl Into<String>, body: Option<MemoryTemplate>) -> Self {
        self.push(identifier, body);
        self
    }

    /// Body of the first entry called `identifier`.
    pub fn get(&self, identifier: &str) -> Option<&MemoryTemplate> {
        self.entries
            .iter()
            .find(|e| e.identifier == identifier)
            .and_then(|e| e.body.as_ref())
    }
}

impl TemplateCatalog for MemoryCatalog {
    fn entries_mut(&mut self) -> Box<dyn Iterator<Item = TemplateEntry<'_>> + '_> {
        Box::new(self.entries.iter_mut().map(|entry| {
            let MemoryEntry { identifier, body } = entry;
            TemplateEntry {
                identifier: identifier.as_str(),
                body: body.as_mut().map(|b| b as &mut dyn TemplateBody),
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::FlowMode;

    fn pool(name: &str, capacity: f64) -> ResourcePool {
        ResourcePool {
            name: name.to_string(),
            capacity,
            amount: 0.0,
            tweakable: false,
            flow_enabled: true,
            flow_mode: FlowMode::Both,
        }
    }

    #[test]
    fn test_replace_pool_drops_every_duplicate() {
        let mut t = MemoryTemplate::ready()
            .with_pool(pool("Food", 1.0))
            .with_pool(pool("Food", 2.0))
            .with_pool(pool("Water", 3.0));
        assert_eq!(t.replace_pool(pool("Food", 4.0)), Ok(()));
        assert_eq!(t.pool_count("Food"), 1);
        assert_eq!(t.pool("Food").unwrap().capacity, 4.0);
        assert_eq!(t.pool_count("Water"), 1);
    }

    #[test]
    fn test_failed_replace_changes_nothing() {
        let mut faults = FaultPlan::default();
        faults
            .pool_write
            .insert("Food".to_string(), HostError::failed("locked"));
        let mut t = MemoryTemplate::ready()
            .with_pool(pool("Food", 1.0))
            .with_pool(pool("Food", 2.0))
            .with_faults(faults);
        let before = t.pools();
        assert!(t.replace_pool(pool("Food", 4.0)).is_err());
        assert_eq!(t.pools(), before);

        let mut t = MemoryTemplate::uninitialized().with_pool(pool("Food", 1.0));
        assert_eq!(
            t.replace_pool(pool("Food", 4.0)),
            Err(HostError::ContainerUnavailable)
        );
        assert_eq!(t.pools(), vec![pool("Food", 1.0)]);
    }

    #[test]
    fn test_uninitialized_container_is_unavailable() {
        let mut t = MemoryTemplate::uninitialized();
        assert!(t.has_resource_container());
        assert!(!t.containers_valid());
        assert_eq!(
            t.replace_pool(pool("Food", 1.0)),
            Err(HostError::ContainerUnavailable)
        );
        t.setup_containers().unwrap();
        assert!(t.containers_valid());
        assert_eq!(t.setup_count, 1);
        assert!(t.replace_pool(pool("Food", 1.0)).is_ok());
    }

    #[test]
    fn test_setup_creates_missing_container() {
        let mut t = MemoryTemplate::without_container();
        assert!(!t.has_resource_container());
        t.setup_containers().unwrap();
        assert!(t.has_resource_container());
    }

    #[test]
    fn test_per_name_fault_overrides_blanket_fault() {
        let mut faults = FaultPlan {
            pools: Some(HostError::ContainerUnavailable),
            ..FaultPlan::default()
        };
        faults
            .pool_write
            .insert("Oxygen".to_string(), HostError::failed("valve stuck"));
        assert_eq!(
            faults.pool_fault("Oxygen"),
            Some(HostError::failed("valve stuck"))
        );
        assert_eq!(faults.pool_fault("Food"), Some(HostError::ContainerUnavailable));
        // Persistent faults keep firing.
        assert!(faults.pool_fault("Oxygen").is_some());
    }

    #[test]
    fn test_transient_fault_fires_once() {
        let mut faults = FaultPlan {
            transient: true,
            ..FaultPlan::default()
        };
        faults
            .pool_write
            .insert("Oxygen".to_string(), HostError::failed("valve stuck"));
        assert!(faults.pool_fault("Oxygen").is_some());
        assert!(faults.pool_fault("Oxygen").is_none());
    }

    #[test]
    fn test_catalog_entries_in_order() {
        let mut catalog = MemoryCatalog::new()
            .with("kerbalEVA", Some(MemoryTemplate::ready()))
            .with("mk1pod", None)
            .with("kerbalEVAfemale", Some(MemoryTemplate::ready()));
        let ids: Vec<String> = catalog
            .entries_mut()
            .map(|e| e.identifier.to_string())
            .collect();
        assert_eq!(ids, vec!["kerbalEVA", "mk1pod", "kerbalEVAfemale"]);
    }

    #[test]
    fn test_catalog_from_json() {
        let json = r#"{"entries": [
            {"identifier": "kerbalEVA", "body": {"resources": [], "initialized": true}},
            {"identifier": "brokenPart"}
        ]}"#;
        let catalog = MemoryCatalog::from_json(json).unwrap();
        assert!(catalog.get("kerbalEVA").unwrap().containers_valid());
        assert!(catalog.get("brokenPart").is_none());
    }
}
