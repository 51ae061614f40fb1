//! Error types for configuration loading, host primitives, and provisioning.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resources::TrackedResource;

/// Failure reported by a host primitive (module add, pool add, setup).
///
/// Hosts classify their own failures. `ContainerUnavailable` is the
/// recognised signature of a context where the container legitimately
/// cannot be built (headless or prefab-only); callers treat it as a
/// successful no-op.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostError {
    #[error("container not constructible in this context")]
    ContainerUnavailable,

    #[error("{message}")]
    Failed { message: String },
}

impl HostError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    pub fn is_expected_absence(&self) -> bool {
        matches!(self, Self::ContainerUnavailable)
    }
}

/// Where in the provisioning sequence a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    AttachModule,
    SetupContainers,
    WritePool(TrackedResource),
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::AttachModule => write!(f, "life support module attach"),
            Stage::SetupContainers => write!(f, "resource container setup"),
            Stage::WritePool(kind) => write!(f, "{} pool write", kind),
        }
    }
}

/// Unexpected provisioning failure. Expected absences never become one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisionError {
    #[error("unexpected error during {stage} on {template}: {source}")]
    Unexpected {
        template: String,
        stage: Stage,
        #[source]
        source: HostError,
    },
}

impl ProvisionError {
    pub fn unexpected(template: &str, stage: Stage, source: HostError) -> Self {
        Self::Unexpected {
            template: template.to_string(),
            stage,
            source,
        }
    }

    pub fn template(&self) -> &str {
        match self {
            Self::Unexpected { template, .. } => template,
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Self::Unexpected { stage, .. } => *stage,
        }
    }
}

/// Invalid resource names or supply settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("resource name for {0} is empty")]
    EmptyName(TrackedResource),

    #[error("resource name '{name}' used for both {first} and {second}")]
    DuplicateName {
        name: String,
        first: TrackedResource,
        second: TrackedResource,
    },

    #[error("rate for {resource} is not finite: {value}")]
    NonFiniteRate { resource: TrackedResource, value: f64 },

    #[error("resource multiplier must be finite and >= 0, got {0}")]
    InvalidMultiplier(f64),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
