//! Demand channels: the only way tasks in this crate talk to each other.
//!
//! ## Contents
//! - [`demand_channel`] creates a connected ([`Supply`], [`Demand`]) pair
//! - [`Request`] a one-shot answer token handed to the producer per demand
//! - [`ChannelState`] observable lifecycle (`Active`, `Closed`, `Abandoned`)

mod demand;

pub use demand::{ChannelState, Demand, Request, Supply, demand_channel};
