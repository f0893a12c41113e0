//! Step definitions for tracker workflow scenarios.

mod given;
mod then;
mod when;
pub mod world;
