//! Bugzilla connector for nocrash.
//!
//! Implements [`nocrash_core::BugQueryService`] over the Bugzilla REST API
//! (`GET /rest/bug`), paging with `limit`/`offset` until a short page comes
//! back. Requests are anonymous; only public fields are requested.

#![forbid(unsafe_code)]

mod client;
mod error;
pub mod params;

pub use client::BugzillaClient;
pub use error::{BugzillaError, BugzillaResult};
