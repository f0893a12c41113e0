//! Issue tracker synchronisation.
//!
//! Local tasks mirror remote tracker issues. This module correlates requests
//! sent over a one-way transport channel with the responses that come back,
//! reconciles local task snapshots with freshly fetched issues, and runs the
//! workflows that mutate remote issues (status transitions, worklogs,
//! assignee and description updates), batch polling and backlog import. It
//! follows hexagonal architecture:
//!
//! - Domain types and the issue mapper in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
