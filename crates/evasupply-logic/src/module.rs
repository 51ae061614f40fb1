//! Life support module attachment.

use crate::error::{ProvisionError, Stage};
use crate::host::{Capability, ModuleDescriptor, TemplateBody};

/// What `attach_module` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleAttach {
    Attached,
    AlreadyPresent,
    /// The host cannot construct the module here; treated as success.
    SkippedExpected,
}

/// Ensure `body` carries exactly one life support module.
///
/// Idempotent: a template that already has one is left alone.
pub fn attach_module(
    template: &str,
    body: &mut dyn TemplateBody,
) -> Result<ModuleAttach, ProvisionError> {
    if body.has_module(&Capability::LifeSupport) {
        return Ok(ModuleAttach::AlreadyPresent);
    }

    match body.add_module(ModuleDescriptor::life_support()) {
        Ok(()) => {
            log::info!("Added life support module to {}", template);
            Ok(ModuleAttach::Attached)
        }
        Err(err) if err.is_expected_absence() => {
            log::debug!(
                "Life support module on {} not constructible in this context, as expected",
                template
            );
            Ok(ModuleAttach::SkippedExpected)
        }
        Err(err) => {
            log::error!(
                "Unexpected error while adding the life support module to {}: {}",
                template,
                err
            );
            Err(ProvisionError::unexpected(
                template,
                Stage::AttachModule,
                err,
            ))
        }
    }
}
