//! Host-facing entrypoints: one-shot bootstrap and repeatable reconfigure.
//!
//! Both run a catalog scan and swallow every error after logging it; the
//! host never sees a failure. The run-once state for `bootstrap` is an
//! explicit [`BootstrapState`] owned by whoever composes the system.
//!
//! ```
//! use evasupply_logic::entrypoints::{BootstrapState, LifeSupportProvisioning};
//! use evasupply_logic::memory::{MemoryCatalog, MemoryTemplate};
//! use evasupply_logic::resources::ResourceNames;
//! use evasupply_logic::settings::{StaticConfig, SupplySettings};
//!
//! let mut catalog = MemoryCatalog::new().with("kerbalEVA", Some(MemoryTemplate::ready()));
//! let config = StaticConfig::active(SupplySettings::default());
//! let ls = LifeSupportProvisioning::new(ResourceNames::default());
//! let mut state = BootstrapState::NotRun;
//!
//! assert!(ls.bootstrap(&mut state, &mut catalog, &config).is_some());
//! assert!(ls.bootstrap(&mut state, &mut catalog, &config).is_none());
//! let report = ls.reconfigure(&mut catalog, &config);
//! assert_eq!(report.provisioned, 1);
//! ```

use crate::host::TemplateCatalog;
use crate::provisioner::Provisioner;
use crate::resources::ResourceNames;
use crate::scanner::{scan, ScanReport, UnitClass};
use crate::settings::{ConfigSource, SupplySettings};

/// Whether `bootstrap` has already run in this process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BootstrapState {
    #[default]
    NotRun,
    Run,
}

/// Composition of names and unit class used by both entrypoints.
#[derive(Debug, Clone)]
pub struct LifeSupportProvisioning {
    names: ResourceNames,
    class: UnitClass,
}

impl LifeSupportProvisioning {
    pub fn new(names: ResourceNames) -> Self {
        log::info!("Life support provisioning created");
        Self {
            names,
            class: UnitClass::default(),
        }
    }

    pub fn with_unit_class(mut self, class: UnitClass) -> Self {
        self.class = class;
        self
    }

    /// Initial provisioning. Runs at most once per `state`.
    ///
    /// Returns `None` when it has already run.
    pub fn bootstrap(
        &self,
        state: &mut BootstrapState,
        catalog: &mut dyn TemplateCatalog,
        config: &dyn ConfigSource,
    ) -> Option<ScanReport> {
        if *state == BootstrapState::Run {
            log::debug!("Life support bootstrap already ran");
            return None;
        }
        log::info!("Running life support bootstrap");
        *state = BootstrapState::Run;
        Some(self.run_scan(catalog, config))
    }

    /// Re-apply current settings after a configuration change.
    pub fn reconfigure(
        &self,
        catalog: &mut dyn TemplateCatalog,
        config: &dyn ConfigSource,
    ) -> ScanReport {
        log::info!("Reapplying life support settings");
        self.run_scan(catalog, config)
    }

    fn run_scan(&self, catalog: &mut dyn TemplateCatalog, config: &dyn ConfigSource) -> ScanReport {
        let supply = current_supply(config);
        let provisioner = Provisioner::new(&self.names);
        let report = scan(catalog, &self.class, &provisioner, supply.as_ref());

        if let Some(err) = &report.first_unexpected {
            log::error!(
                "Failed to add life support to the EVA; scan stopped after {} of {} templates: {}",
                report.provisioned,
                report.matched,
                err
            );
        } else {
            log::info!(
                "Life support provisioned on {} of {} EVA templates",
                report.provisioned,
                report.matched
            );
        }
        report
    }
}

/// Read settings from `config`, discarding invalid ones.
fn current_supply(config: &dyn ConfigSource) -> Option<SupplySettings> {
    let supply = config.supply()?;
    match supply.validate() {
        Ok(()) => Some(supply),
        Err(err) => {
            log::error!("Ignoring invalid life support settings: {}", err);
            None
        }
    }
}
