//! Issue sync: keeps local tasks in step with a remote issue tracker.
//!
//! Tracker calls travel over a fire-and-forget channel to an external
//! process; responses come back on a separate channel. This crate turns that
//! channel into ordinary request futures and builds reconciliation and
//! workflow logic on top.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Issue payloads, task snapshots, settings and wire messages
//! - **Ports**: Trait interfaces for the transport, task storage, dialogs,
//!   notifications and connectivity
//! - **Adapters**: Channel transport and in-memory implementations of every
//!   port
//!
//! # Modules
//!
//! - [`tracker`]: Request correlation, reconciliation and tracker workflows

pub mod tracker;
