//! Unit tests for the tracker services.
//!
//! The services run against the in-memory adapters, with the fake tracker
//! serving the transport channel.

mod support;
