//! evasupply Headless Provisioning Harness
//!
//! Runs bootstrap and a series of reconfigures against the JSON fixtures
//! in `data/`, then checks the resulting catalog. Runs entirely
//! in-process with no engine and no rendering.
//!
//! Usage:
//!   cargo run -p evasupply-simtest
//!   cargo run -p evasupply-simtest -- --verbose
//!
//! Log output is controlled with `RUST_LOG` (e.g. `RUST_LOG=debug`).

use evasupply_logic::entrypoints::{BootstrapState, LifeSupportProvisioning};
use evasupply_logic::host::{Capability, TemplateBody};
use evasupply_logic::memory::MemoryCatalog;
use evasupply_logic::provisioner::ProvisionOutcome;
use evasupply_logic::resources::{ResourceNames, TrackedResource};
use evasupply_logic::settings::{StaticConfig, SupplySettings};

// ── Fixtures (same files a host integration would ship) ─────────────────
const NAMES_JSON: &str = include_str!("../../../data/resource_names.json");
const SETTINGS_JSON: &str = include_str!("../../../data/life_support_settings.json");
const CATALOG_JSON: &str = include_str!("../../../data/eva_catalog.json");

/// Templates the fixture expects to be fully provisioned.
const PROVISIONED: [&str; 4] = [
    "kerbalEVA",
    "kerbalEVAfemale",
    "kerbalEVAVintage",
    "kerbalEVAFuture",
];

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail: detail.into(),
    }
}

struct Fixtures {
    names: ResourceNames,
    settings: SupplySettings,
    catalog: MemoryCatalog,
}

fn main() {
    env_logger::init();
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== evasupply Provisioning Harness ===\n");

    let mut results = Vec::new();

    // 1. Fixture loading
    let fixtures = match load_fixtures(&mut results) {
        Some(f) => f,
        None => {
            report(&results, verbose);
            std::process::exit(1);
        }
    };

    let ls = LifeSupportProvisioning::new(fixtures.names.clone());
    let mut catalog = fixtures.catalog.clone();
    let config = StaticConfig::active(fixtures.settings);

    // 2. Bootstrap
    results.extend(validate_bootstrap(&ls, &mut catalog, &config, &fixtures));

    // 3. Reconfigure convergence and idempotence
    results.extend(validate_reconfigure(&ls, &mut catalog, &config, &fixtures));

    // 4. Settings changes
    results.extend(validate_settings_changes(&ls, &mut catalog, &fixtures));

    if !report(&results, verbose) {
        std::process::exit(1);
    }
}

fn report(results: &[TestResult], verbose: bool) -> bool {
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    for r in results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed,
        results.len(),
        failed
    );
    failed == 0
}

// ── 1. Fixtures ─────────────────────────────────────────────────────────

fn load_fixtures(results: &mut Vec<TestResult>) -> Option<Fixtures> {
    println!("--- Fixtures ---");

    let names = ResourceNames::from_json(NAMES_JSON);
    results.push(check(
        "names_parse",
        names.is_ok(),
        match &names {
            Ok(_) => "7 resource names loaded".to_string(),
            Err(e) => e.to_string(),
        },
    ));

    let settings = StaticConfig::from_json(SETTINGS_JSON).map(|c| c.supply);
    let settings = match settings {
        Ok(Some(s)) => Ok(s),
        Ok(None) => Err("settings fixture has no active session".to_string()),
        Err(e) => Err(e.to_string()),
    };
    results.push(check(
        "settings_parse",
        settings.is_ok(),
        match &settings {
            Ok(s) => format!("multiplier {}", s.multiplier),
            Err(e) => e.clone(),
        },
    ));

    let catalog = MemoryCatalog::from_json(CATALOG_JSON);
    results.push(check(
        "catalog_parse",
        catalog.is_ok(),
        match &catalog {
            Ok(c) => format!("{} catalog entries", c.entries.len()),
            Err(e) => e.to_string(),
        },
    ));

    Some(Fixtures {
        names: names.ok()?,
        settings: settings.ok()?,
        catalog: catalog.ok()?,
    })
}

// ── 2. Bootstrap ────────────────────────────────────────────────────────

fn validate_bootstrap(
    ls: &LifeSupportProvisioning,
    catalog: &mut MemoryCatalog,
    config: &StaticConfig,
    fixtures: &Fixtures,
) -> Vec<TestResult> {
    println!("--- Bootstrap ---");
    let mut results = Vec::new();
    let mut state = BootstrapState::NotRun;

    let Some(scan) = ls.bootstrap(&mut state, catalog, config) else {
        results.push(check("bootstrap_runs", false, "first bootstrap was a no-op"));
        return results;
    };

    results.push(check(
        "bootstrap_counts",
        scan.matched == 6 && scan.provisioned == 4,
        format!("matched {}, provisioned {}", scan.matched, scan.provisioned),
    ));
    results.push(check(
        "bootstrap_no_abort",
        scan.first_unexpected.is_none(),
        format!("{:?}", scan.first_unexpected),
    ));
    results.push(check(
        "bootstrap_skips",
        scan.skipped_no_body == ["kerbalEVAfemaleFuture"]
            && scan.skipped_no_container == ["kerbalEVAslimSuit"],
        format!(
            "no body {:?}, no container {:?}",
            scan.skipped_no_body, scan.skipped_no_container
        ),
    ));

    let lazily_set_up = catalog
        .get("kerbalEVA")
        .map(|t| t.setup_count == 1)
        .unwrap_or(false);
    results.push(check(
        "bootstrap_lazy_setup",
        lazily_set_up,
        "uninitialised containers were set up before writing",
    ));

    let female = catalog.get("kerbalEVAfemale");
    let o2_ok = female
        .and_then(|t| t.pool(fixtures.names.name(TrackedResource::Oxygen)))
        .map(|p| (p.capacity - fixtures.settings.capacity(TrackedResource::Oxygen)).abs() < 1e-9)
        .unwrap_or(false);
    let o2_count = female
        .map(|t| t.pool_count(fixtures.names.name(TrackedResource::Oxygen)))
        .unwrap_or(0);
    results.push(check(
        "bootstrap_duplicates_collapsed",
        o2_ok && o2_count == 1,
        format!("{} Oxygen pool(s) on kerbalEVAfemale", o2_count),
    ));

    let vintage_ok = catalog
        .get("kerbalEVAVintage")
        .map(|t| t.modules.is_empty() && t.pools().len() == 7)
        .unwrap_or(false);
    results.push(check(
        "bootstrap_expected_absence",
        vintage_ok,
        "module not constructible on kerbalEVAVintage, pools still written",
    ));

    let future_partial = scan.outcomes.iter().any(|(id, outcome)| match outcome {
        ProvisionOutcome::Provisioned(r) => {
            id == "kerbalEVAFuture" && r.written() == 6 && r.failures().len() == 1
        }
        _ => false,
    });
    results.push(check(
        "bootstrap_partial_template",
        future_partial,
        "one pool failure on kerbalEVAFuture left six pools written",
    ));

    let again = ls.bootstrap(&mut state, catalog, config);
    results.push(check(
        "bootstrap_once",
        again.is_none() && state == BootstrapState::Run,
        "second bootstrap is a no-op",
    ));

    results
}

// ── 3. Reconfigure ──────────────────────────────────────────────────────

fn validate_reconfigure(
    ls: &LifeSupportProvisioning,
    catalog: &mut MemoryCatalog,
    config: &StaticConfig,
    fixtures: &Fixtures,
) -> Vec<TestResult> {
    println!("--- Reconfigure ---");
    let mut results = Vec::new();

    let scan = ls.reconfigure(catalog, config);
    results.push(check(
        "reconfigure_no_abort",
        scan.first_unexpected.is_none(),
        format!("{:?}", scan.first_unexpected),
    ));

    let (complete, detail) = all_complete(catalog, &fixtures.names);
    results.push(check("reconfigure_converges", complete, detail));

    let snapshot = catalog.clone();
    for _ in 0..3 {
        ls.reconfigure(catalog, config);
    }
    let stable = PROVISIONED.iter().all(|id| {
        let before = snapshot.get(id);
        let after = catalog.get(id);
        match (before, after) {
            (Some(b), Some(a)) => b.pools() == a.pools() && b.modules == a.modules,
            _ => false,
        }
    });
    results.push(check(
        "reconfigure_idempotent",
        stable,
        "three more reconfigures left pools and modules unchanged",
    ));

    results
}

/// Every provisioned template has one module slot used at most once and
/// exactly one pool per tracked name.
fn all_complete(catalog: &MemoryCatalog, names: &ResourceNames) -> (bool, String) {
    for id in PROVISIONED {
        let Some(t) = catalog.get(id) else {
            return (false, format!("{} missing from catalog", id));
        };
        if t.module_count(&Capability::LifeSupport) > 1 {
            return (false, format!("{} has duplicate modules", id));
        }
        if t.pools().len() != 7 {
            return (false, format!("{} has {} pools", id, t.pools().len()));
        }
        for (_, name) in names.iter() {
            if t.pool_count(name) != 1 {
                return (false, format!("{} has {} {} pools", id, t.pool_count(name), name));
            }
        }
    }
    (true, format!("{} templates carry all 7 pools", PROVISIONED.len()))
}

// ── 4. Settings changes ─────────────────────────────────────────────────

fn validate_settings_changes(
    ls: &LifeSupportProvisioning,
    catalog: &mut MemoryCatalog,
    fixtures: &Fixtures,
) -> Vec<TestResult> {
    println!("--- Settings Changes ---");
    let mut results = Vec::new();

    // Shorter EVA buffer: one hour.
    let hour = SupplySettings {
        multiplier: 3600.0,
        ..fixtures.settings
    };
    ls.reconfigure(catalog, &StaticConfig::active(hour));
    let mismatches = capacity_mismatches(catalog, &fixtures.names, &hour);
    results.push(check(
        "multiplier_change_applied",
        mismatches.is_empty(),
        if mismatches.is_empty() {
            "capacities follow rate × 3600".to_string()
        } else {
            mismatches.join(", ")
        },
    ));

    // No session: pools stay as they were.
    let before = catalog.clone();
    ls.reconfigure(catalog, &StaticConfig::inactive());
    results.push(check(
        "no_session_leaves_pools",
        before == *catalog,
        "reconfigure without a session changed nothing",
    ));

    let zero = SupplySettings {
        multiplier: 0.0,
        ..fixtures.settings
    };
    let scan = ls.reconfigure(catalog, &StaticConfig::active(zero));
    let all_zero = PROVISIONED.iter().all(|id| {
        catalog
            .get(id)
            .map(|t| t.pools().iter().all(|p| p.capacity == 0.0 && p.amount == 0.0))
            .unwrap_or(false)
    });
    results.push(check(
        "zero_multiplier",
        all_zero && scan.first_unexpected.is_none(),
        "zero multiplier empties every pool without error",
    ));

    results
}

fn capacity_mismatches(
    catalog: &MemoryCatalog,
    names: &ResourceNames,
    settings: &SupplySettings,
) -> Vec<String> {
    let mut out = Vec::new();
    for id in PROVISIONED {
        let Some(t) = catalog.get(id) else { continue };
        for kind in TrackedResource::ALL {
            let expected = settings.capacity(kind);
            match t.pool(names.name(kind)) {
                Some(p) if (p.capacity - expected).abs() < 1e-9 && p.amount == 0.0 => {}
                Some(p) => out.push(format!("{}/{}: {} != {}", id, kind, p.capacity, expected)),
                None => out.push(format!("{}/{}: missing", id, kind)),
            }
        }
    }
    out
}
