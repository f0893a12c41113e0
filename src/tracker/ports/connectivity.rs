//! Host connectivity probe.

/// Reports whether the host currently has network access.
pub trait Connectivity: Send + Sync {
    /// Returns `true` when the host is online.
    fn is_online(&self) -> bool;
}
