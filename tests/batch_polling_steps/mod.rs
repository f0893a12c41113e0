//! Step definitions for batch polling scenarios.

mod given;
mod then;
mod when;
pub mod world;
