//! nocrash-core: find crash bugs that stopped crashing.
//!
//! Open bugs carry crash signatures. When none of a bug's signatures has
//! crashed during the lookback window, the bug is a candidate for closure.
//!
//! # Architecture
//!
//! ```text
//! BugQueryService → Collector → universe + per-bug signatures
//!                                   ↓
//!                             Batch planner (≤ 1536 chars per batch)
//!                                   ↓
//! CrashOccurrenceService ← Resolver (concurrent facet searches, shrinks universe)
//!                                   ↓
//!                             Decider → closure candidates
//! ```
//!
//! # Modules
//!
//! - `signature`: signature field parsing and insertion-ordered sets
//! - `window`: lookback window arithmetic
//! - `service`: collaborator traits and their request/response types
//! - `collector`: bug search and signature extraction
//! - `planner`: first-fit batch planning
//! - `resolver`: crash facet searches
//! - `decider`: closure eligibility
//! - `pipeline`: one full triage pass
//! - `report`: run output
//! - `config`: TOML configuration
//!
//! This crate has no HTTP dependency; see the `connectors/` crates.

#![forbid(unsafe_code)]

pub mod collector;
pub mod config;
pub mod decider;
pub mod error;
pub mod pipeline;
pub mod planner;
pub mod report;
pub mod resolver;
pub mod service;
pub mod signature;
pub mod window;

pub use collector::CollectedSignatures;
pub use config::Config;
pub use decider::ClosureCandidate;
pub use error::{ConfigError, Error, Result};
pub use pipeline::NoCrashes;
pub use planner::{BATCH_BUDGET, Batch, BatchPlan};
pub use report::{AutofixChange, NoCrashReport, RunStats};
pub use service::{
    BugQuery, BugQueryService, CrashOccurrenceService, FacetQuery, FacetResponse, FacetTerm,
    RawBug,
};
pub use signature::SignatureSet;
pub use window::QueryWindow;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
