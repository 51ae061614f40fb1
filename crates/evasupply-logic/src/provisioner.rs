//! Per-template provisioning: module attach, container setup, seven pools.
//!
//! Failures are contained at the narrowest level that makes sense:
//! - an expected absence anywhere is a silent no-op,
//! - an unexpected module or pool failure is logged and recorded in the
//!   report while the remaining pools are still written,
//! - an unexpected container setup failure is returned as an error, since
//!   nothing further can be done for the template.

use crate::error::{HostError, ProvisionError, Stage};
use crate::host::{ResourcePool, TemplateBody};
use crate::module::{attach_module, ModuleAttach};
use crate::pool_writer::{write_pool, PoolWrite};
use crate::resources::{ResourceNames, TrackedResource};
use crate::settings::SupplySettings;

/// Result of writing one tracked resource.
#[derive(Debug, Clone, PartialEq)]
pub enum PoolStatus {
    Written(ResourcePool),
    Skipped,
    Failed(ProvisionError),
}

/// Everything that happened to one template.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionReport {
    pub module: Result<ModuleAttach, ProvisionError>,
    /// Whether lazy container setup had to run.
    pub setup_ran: bool,
    /// One entry per tracked resource, in `TrackedResource::ALL` order.
    pub pools: Vec<(TrackedResource, PoolStatus)>,
}

impl ProvisionReport {
    pub fn written(&self) -> usize {
        self.pools
            .iter()
            .filter(|(_, s)| matches!(s, PoolStatus::Written(_)))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.pools
            .iter()
            .filter(|(_, s)| matches!(s, PoolStatus::Skipped))
            .count()
    }

    /// Unexpected failures, module first then pools.
    pub fn failures(&self) -> Vec<&ProvisionError> {
        let module = self.module.as_ref().err();
        let pools = self.pools.iter().filter_map(|(_, s)| match s {
            PoolStatus::Failed(err) => Some(err),
            _ => None,
        });
        module.into_iter().chain(pools).collect()
    }

    pub fn status(&self, kind: TrackedResource) -> Option<&PoolStatus> {
        self.pools.iter().find(|(k, _)| *k == kind).map(|(_, s)| s)
    }
}

/// Outcome of provisioning a template that did not hit a fatal error.
#[derive(Debug, Clone, PartialEq)]
pub enum ProvisionOutcome {
    /// No instantiable body; nothing to do.
    MissingPrefab,
    /// Module handled, but no session settings to size pools with.
    NoActiveSession {
        module: Result<ModuleAttach, ProvisionError>,
    },
    Provisioned(ProvisionReport),
}

/// Applies the life support setup to single templates.
pub struct Provisioner<'a> {
    names: &'a ResourceNames,
}

impl<'a> Provisioner<'a> {
    pub fn new(names: &'a ResourceNames) -> Self {
        Self { names }
    }

    /// Provision one template.
    ///
    /// Pools always start empty. `supply` is `None` when no session is
    /// active, in which case only the module is attached.
    pub fn provision(
        &self,
        template: &str,
        body: Option<&mut dyn TemplateBody>,
        supply: Option<&SupplySettings>,
    ) -> Result<ProvisionOutcome, ProvisionError> {
        let Some(body) = body else {
            log::info!("Template {} has no prefab body", template);
            return Ok(ProvisionOutcome::MissingPrefab);
        };

        let module = attach_module(template, body);

        let Some(supply) = supply else {
            log::debug!(
                "No active session; skipping resource pools on {}",
                template
            );
            return Ok(ProvisionOutcome::NoActiveSession { module });
        };

        let setup_ran = ensure_containers(template, body)?;

        let pools = TrackedResource::ALL
            .iter()
            .map(|&kind| {
                let status = match write_pool(
                    template,
                    body,
                    kind,
                    self.names.name(kind),
                    supply.rate(kind),
                    supply.multiplier,
                    false,
                ) {
                    Ok(PoolWrite::Written(pool)) => PoolStatus::Written(pool),
                    Ok(PoolWrite::Skipped) => PoolStatus::Skipped,
                    Err(err) => PoolStatus::Failed(err),
                };
                (kind, status)
            })
            .collect();

        Ok(ProvisionOutcome::Provisioned(ProvisionReport {
            module,
            setup_ran,
            pools,
        }))
    }
}

/// Initialise the resource containers if either copy is invalid.
fn ensure_containers(template: &str, body: &mut dyn TemplateBody) -> Result<bool, ProvisionError> {
    if body.containers_valid() {
        return Ok(false);
    }
    match body.setup_containers() {
        Ok(()) => Ok(true),
        Err(HostError::ContainerUnavailable) => {
            log::debug!(
                "Resource containers on {} not constructible in this context",
                template
            );
            Ok(false)
        }
        Err(err) => {
            log::error!(
                "Failed to set up resource containers on {}: {}",
                template,
                err
            );
            Err(ProvisionError::unexpected(
                template,
                Stage::SetupContainers,
                err,
            ))
        }
    }
}
