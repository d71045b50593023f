//! # Event subscribers for the powser runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and built-in implementations for handling runtime events broadcast through
//! the [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   operator task ── publish(Event) ──► Bus ──► session listener
//!                                                   │
//!                                                   ├──► SubscriberSet::emit(&Event)
//!                                                   │         │
//!                                                   │    ┌────┴────┬─────────┐
//!                                                   │    ▼         ▼         ▼
//!                                                   │  LogWriter  Custom    ...
//!                                                   │
//!                                                   └──► AliveTracker (live task labels)
//! ```

mod subscribe;
mod subscriber_set;

#[cfg(feature = "logging")]
mod embedded;

pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
