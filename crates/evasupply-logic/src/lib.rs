//! EVA life support provisioning.
//!
//! Attaches a life support module and seven resource pools to every EVA
//! unit template in a host catalog, sized from configured consumption and
//! production rates. Provisioning is idempotent: pools are replaced, never
//! merged, and the module is attached at most once, so re-running after a
//! settings change converges on the new values.
//!
//! The host (template catalog, settings screens) is reached only through
//! the traits in [`host`] and [`settings`]; [`memory`] provides a plain
//! data implementation for tests and headless runs.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`entrypoints`] | One-shot `bootstrap` and repeatable `reconfigure` |
//! | [`error`] | Host, provisioning, and configuration error types |
//! | [`host`] | Template catalog traits, pools, module descriptors |
//! | [`memory`] | In-memory host with fault injection |
//! | [`module`] | Life support module attachment |
//! | [`pool_writer`] | Replace-not-merge resource pool writes |
//! | [`provisioner`] | Per-template provisioning and its report |
//! | [`resources`] | Tracked resource kinds and canonical names |
//! | [`scanner`] | Unit-class catalog scan with fail-fast policy |
//! | [`settings`] | Rates, multiplier, and the configuration source |

pub mod entrypoints;
pub mod error;
pub mod host;
pub mod memory;
pub mod module;
pub mod pool_writer;
pub mod provisioner;
pub mod resources;
pub mod scanner;
pub mod settings;
