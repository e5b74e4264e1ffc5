//! Socorro connector for nocrash.
//!
//! Implements [`nocrash_core::CrashOccurrenceService`] with SuperSearch
//! (`GET /api/SuperSearch/`): zero hits, a `signature` facet, and one
//! `signature==<value>` exact-match term per batch member.

#![forbid(unsafe_code)]

mod client;
mod error;

pub use client::{SuperSearchClient, supersearch_params};
pub use error::{SocorroError, SocorroResult};
