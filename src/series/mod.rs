//! # Lazy power series and the split machinery behind them.
//!
//! - [`PowerSeries`]: single-pass consumer handle (`pull`, `pull_n`, `split`, …).
//! - `split`: the per-term link chain that serves two forks from one source.
//! - `knot`: self-referential definitions built on a split.

pub(crate) mod knot;
mod power_series;
mod split;

pub use power_series::PowerSeries;
pub(crate) use power_series::{Tether, pipe};
