//! Catalog scan: find EVA unit templates and provision each one.
//!
//! Templates are visited in catalog order. The first unexpected error
//! stops the scan; templates already provisioned keep their changes.

use serde::{Deserialize, Serialize};

use crate::error::ProvisionError;
use crate::host::TemplateCatalog;
use crate::provisioner::{ProvisionOutcome, Provisioner};
use crate::settings::SupplySettings;

/// Identifier marker of EVA unit templates in the stock catalog.
pub const DEFAULT_UNIT_MARKER: &str = "kerbalEVA";

/// Predicate selecting the unit class by identifier substring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitClass {
    pub marker: String,
}

impl Default for UnitClass {
    fn default() -> Self {
        Self {
            marker: DEFAULT_UNIT_MARKER.to_string(),
        }
    }
}

impl UnitClass {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn matches(&self, identifier: &str) -> bool {
        identifier.contains(self.marker.as_str())
    }
}

/// Summary of one scan over the catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanReport {
    /// Templates matching the unit class.
    pub matched: usize,
    /// Templates handed to the provisioner.
    pub provisioned: usize,
    /// Matching templates with no prefab body.
    pub skipped_no_body: Vec<String>,
    /// Matching templates whose body has no resource container.
    pub skipped_no_container: Vec<String>,
    /// Per-template outcome, in visit order.
    pub outcomes: Vec<(String, ProvisionOutcome)>,
    /// The error that stopped the scan, if any.
    pub first_unexpected: Option<ProvisionError>,
}

impl ScanReport {
    pub fn aborted(&self) -> bool {
        self.first_unexpected.is_some()
    }
}

/// Provision every template of `class` in `catalog`.
pub fn scan(
    catalog: &mut dyn TemplateCatalog,
    class: &UnitClass,
    provisioner: &Provisioner<'_>,
    supply: Option<&SupplySettings>,
) -> ScanReport {
    let mut report = ScanReport::default();

    for entry in catalog.entries_mut() {
        if !class.matches(entry.identifier) {
            continue;
        }
        report.matched += 1;

        let Some(body) = entry.body else {
            log::info!("Part {} has no prefab body", entry.identifier);
            report.skipped_no_body.push(entry.identifier.to_string());
            continue;
        };
        if !body.has_resource_container() {
            log::info!("Part {} has no resource container", entry.identifier);
            report
                .skipped_no_container
                .push(entry.identifier.to_string());
            continue;
        }

        report.provisioned += 1;
        match provisioner.provision(entry.identifier, Some(body), supply) {
            Ok(outcome) => report
                .outcomes
                .push((entry.identifier.to_string(), outcome)),
            Err(err) => {
                log::error!("Failed to add life support to the EVA: {}", err);
                report.first_unexpected = Some(err);
                break;
            }
        }
    }

    report
}
