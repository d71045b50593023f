//! # Session configuration.
//!
//! Provides [`Config`], the centralized settings for a [`Session`](crate::Session).
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by the bus
//! - `grace = 0s` → `join_idle`/`shutdown` only succeed if nothing is alive at all

use std::time::Duration;

/// Configuration for a [`Session`](crate::Session).
///
/// ## Field semantics
/// - `grace`: Maximum wait for operator tasks to exit in `join_idle`/`shutdown`
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
/// - `trace_links`: Publish one `LinkSpawned` event per split-chain link
///
/// ## Notes
/// All fields are public for flexibility. Prefer using helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time to wait for operator tasks to exit.
    ///
    /// When it elapses, `join_idle`/`shutdown` return `RuntimeError::GraceExceeded`
    /// with the labels of the tasks still alive.
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow listeners that lag behind more than `bus_capacity` messages skip
    /// older items. Minimum value is 1 (enforced by Bus).
    pub bus_capacity: usize,

    /// Whether split chains publish an event for every link they spawn.
    ///
    /// A split spawns one link per term, so this is off by default.
    pub trace_links: bool,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `grace = 5s`
    /// - `bus_capacity = 1024`
    /// - `trace_links = false`
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(5),
            bus_capacity: 1024,
            trace_links: false,
        }
    }
}
