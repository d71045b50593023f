//! # Core runtime: session, configuration and liveness tracking.
//!
//! - [`Session`]: spawns operator tasks, delivers events, tears down.
//! - [`SessionBuilder`]: wires subscribers into a session.
//! - [`Config`]: grace period, bus capacity, link tracing.
//! - [`AliveTracker`]: labels of operator tasks still running.

mod alive;
mod builder;
mod config;
mod session;

pub use alive::AliveTracker;
pub use builder::SessionBuilder;
pub use config::Config;
pub use session::Session;
