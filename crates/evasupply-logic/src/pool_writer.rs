//! Writes a single named resource pool onto a template.
//!
//! Writing always replaces: any existing pool with the same name is
//! removed before the fresh one is added, so repeated writes converge on
//! the latest capacity instead of accumulating stale pools.

use crate::error::{ProvisionError, Stage};
use crate::host::{FlowMode, ResourcePool, TemplateBody};
use crate::resources::TrackedResource;

/// Result of a successful pool write.
#[derive(Debug, Clone, PartialEq)]
pub enum PoolWrite {
    /// The pool now holds exactly this state.
    Written(ResourcePool),
    /// The container is not constructible here; nothing changed.
    Skipped,
}

/// Build the pool that a write would add.
pub fn build_pool(name: &str, rate: f64, multiplier: f64, start_full: bool) -> ResourcePool {
    let capacity = rate * multiplier;
    ResourcePool {
        name: name.to_string(),
        capacity,
        amount: if start_full { capacity } else { 0.0 },
        tweakable: false,
        flow_enabled: true,
        flow_mode: FlowMode::Both,
    }
}

/// Replace the pool for `kind` on `body` with one sized `rate × multiplier`.
///
/// The host replaces all or nothing, so on any failure the template's
/// pool for this resource is left as it was.
pub fn write_pool(
    template: &str,
    body: &mut dyn TemplateBody,
    kind: TrackedResource,
    name: &str,
    rate: f64,
    multiplier: f64,
    start_full: bool,
) -> Result<PoolWrite, ProvisionError> {
    let pool = build_pool(name, rate, multiplier, start_full);

    match body.replace_pool(pool.clone()) {
        Ok(()) => Ok(PoolWrite::Written(pool)),
        Err(err) if err.is_expected_absence() => {
            log::debug!(
                "{} pool not constructible on {} in this context; skipped",
                name,
                template
            );
            Ok(PoolWrite::Skipped)
        }
        Err(err) => {
            log::error!(
                "Unexpected error while adding resource {} to {}: {}",
                name,
                template,
                err
            );
            Err(ProvisionError::unexpected(
                template,
                Stage::WritePool(kind),
                err,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;
    use crate::memory::{FaultPlan, MemoryTemplate};

    const O2: TrackedResource = TrackedResource::Oxygen;

    fn write(
        t: &mut MemoryTemplate,
        rate: f64,
        multiplier: f64,
    ) -> Result<PoolWrite, ProvisionError> {
        write_pool("kerbalEVA", t, O2, "Oxygen", rate, multiplier, false)
    }

    #[test]
    fn test_build_pool_empty_and_full() {
        let empty = build_pool("Food", 0.5, 10.0, false);
        assert_eq!(empty.capacity, 5.0);
        assert_eq!(empty.amount, 0.0);
        assert!(!empty.tweakable);
        assert!(empty.flow_enabled);
        assert_eq!(empty.flow_mode, FlowMode::Both);

        let full = build_pool("Food", 0.5, 10.0, true);
        assert_eq!(full.amount, 5.0);
    }

    #[test]
    fn test_write_then_rewrite_replaces() {
        let mut t = MemoryTemplate::ready();
        write(&mut t, 0.02, 3600.0).unwrap();
        let p = t.pool("Oxygen").unwrap();
        assert!((p.capacity - 72.0).abs() < 1e-9);
        assert_eq!(p.amount, 0.0);

        write(&mut t, 0.03, 3600.0).unwrap();
        assert_eq!(t.pool_count("Oxygen"), 1);
        let p = t.pool("Oxygen").unwrap();
        assert!((p.capacity - 108.0).abs() < 1e-9);
        assert_eq!(p.amount, 0.0);
    }

    #[test]
    fn test_duplicate_pools_collapse_to_one() {
        let mut t = MemoryTemplate::ready()
            .with_pool(build_pool("Oxygen", 1.0, 1.0, true))
            .with_pool(build_pool("Oxygen", 2.0, 1.0, true));
        write(&mut t, 0.5, 4.0).unwrap();
        assert_eq!(t.pool_count("Oxygen"), 1);
        assert_eq!(t.pool("Oxygen").unwrap().capacity, 2.0);
    }

    #[test]
    fn test_zero_capacity_is_valid() {
        let mut t = MemoryTemplate::ready();
        let result = write(&mut t, 0.02, 0.0).unwrap();
        match result {
            PoolWrite::Written(p) => {
                assert_eq!(p.capacity, 0.0);
                assert_eq!(p.amount, 0.0);
            }
            PoolWrite::Skipped => panic!("zero capacity should still be written"),
        }
    }

    #[test]
    fn test_expected_absence_is_silent_no_op() {
        let mut t = MemoryTemplate::ready().with_faults(FaultPlan::headless());
        assert_eq!(write(&mut t, 0.02, 3600.0), Ok(PoolWrite::Skipped));
        assert_eq!(t.pool_count("Oxygen"), 0);
    }

    #[test]
    fn test_expected_absence_keeps_existing_pool() {
        let old = build_pool("Oxygen", 1.0, 1.0, true);
        let mut t = MemoryTemplate::ready()
            .with_pool(old.clone())
            .with_faults(FaultPlan::headless());
        assert_eq!(write(&mut t, 0.02, 3600.0), Ok(PoolWrite::Skipped));
        assert_eq!(t.pool("Oxygen"), Some(old));
    }

    fn faulted_oxygen(fault: HostError, transient: bool) -> FaultPlan {
        let mut faults = FaultPlan {
            transient,
            ..FaultPlan::default()
        };
        faults.pool_write.insert("Oxygen".to_string(), fault);
        faults
    }

    #[test]
    fn test_persistent_failure_keeps_previous_pool() {
        let old = build_pool("Oxygen", 1.0, 1.0, true);
        let mut t = MemoryTemplate::ready()
            .with_pool(old.clone())
            .with_faults(faulted_oxygen(HostError::failed("valve stuck"), false));

        for _ in 0..2 {
            let err = write(&mut t, 0.02, 3600.0).unwrap_err();
            assert_eq!(err.stage(), Stage::WritePool(O2));
            assert_eq!(t.pool("Oxygen"), Some(old.clone()));
            assert_eq!(t.pool_count("Oxygen"), 1);
        }
    }

    #[test]
    fn test_persistent_absence_keeps_previous_pool() {
        let old = build_pool("Oxygen", 1.0, 1.0, true);
        let mut t = MemoryTemplate::ready()
            .with_pool(old.clone())
            .with_faults(faulted_oxygen(HostError::ContainerUnavailable, false));

        assert_eq!(write(&mut t, 0.02, 3600.0), Ok(PoolWrite::Skipped));
        assert_eq!(write(&mut t, 0.02, 3600.0), Ok(PoolWrite::Skipped));
        assert_eq!(t.pool("Oxygen"), Some(old));
    }

    #[test]
    fn test_failed_write_leaves_duplicates_alone() {
        let first = build_pool("Oxygen", 1.0, 1.0, true);
        let second = build_pool("Oxygen", 2.0, 1.0, true);
        let mut t = MemoryTemplate::ready()
            .with_pool(first.clone())
            .with_pool(second.clone())
            .with_faults(faulted_oxygen(HostError::failed("valve stuck"), false));

        assert!(write(&mut t, 0.02, 3600.0).is_err());
        assert_eq!(t.pools(), vec![first, second]);
    }

    #[test]
    fn test_transient_failure_converges_on_next_write() {
        let old = build_pool("Oxygen", 1.0, 1.0, true);
        let mut t = MemoryTemplate::ready()
            .with_pool(old.clone())
            .with_faults(faulted_oxygen(HostError::failed("valve stuck"), true));

        assert!(write(&mut t, 0.02, 3600.0).is_err());
        assert_eq!(t.pool("Oxygen"), Some(old));

        write(&mut t, 0.02, 3600.0).unwrap();
        assert!((t.pool("Oxygen").unwrap().capacity - 72.0).abs() < 1e-9);
    }

    #[test]
    fn test_unexpected_failure_without_previous_leaves_nothing() {
        let mut t = MemoryTemplate::ready()
            .with_faults(faulted_oxygen(HostError::failed("valve stuck"), false));
        assert!(write(&mut t, 0.02, 3600.0).is_err());
        assert_eq!(t.pool_count("Oxygen"), 0);
    }

    #[test]
    fn test_other_pools_untouched() {
        let food = build_pool("Food", 1.0, 2.0, false);
        let mut t = MemoryTemplate::ready().with_pool(food.clone());
        write(&mut t, 0.02, 3600.0).unwrap();
        assert_eq!(t.pool("Food"), Some(food));
    }
}
