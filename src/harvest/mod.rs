//! Run orchestration
//!
//! Wires the session, pagination walker, listing scraper, merge/cache layer,
//! and PDF archiver into one sequential run.

mod coordinator;

pub use coordinator::{run_harvest, Harvester, RunSummary};
