//! # powser
//!
//! **powser** computes with formal power series over exact rationals. A series
//! is not a stored array but a lazily produced stream: every term is computed
//! when a consumer asks for it, so series that are infinite in principle
//! (`1/(1−x) = 1, 1, 1, …`) still cost one bounded step per requested term.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   Session::ones()          Session::polynomial(..)
//!        │                           │
//!        ▼                           ▼
//!   ┌──────────┐  demand  ┌──────────────────┐  demand  ┌──────────┐
//!   │ generate │ ◄─────── │ multiply / add … │ ◄─────── │ consumer │
//!   │   task   │ ───────► │   operator task  │ ───────► │  pull()  │
//!   └──────────┘  term    └───────┬──────────┘  term    └──────────┘
//!                                 │ split()
//!                                 ▼
//!                      W0 ─► W1 ─► W2 ─► …   (one link per term in flight)
//!
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Session (runtime host)                                           │
//! │  - TaskTracker over every operator task                           │
//! │  - CancellationToken root (child token per task)                  │
//! │  - Bus (broadcast events) ─► AliveTracker + SubscriberSet         │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Pull protocol
//! ```text
//! consumer                      operator task                 upstream
//!   pull() ── request ─────────► next_request()
//!                                 pull() ── request ─────────► …
//!                                        ◄────────── term ──── respond(c)
//!          ◄──────── term ──────  respond(f(c))
//!
//! drop(series) ─► next_request() == None ─► task exits, drops its inputs
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                     |
//! |-------------------|----------------------------------------------------------|----------------------------------------|
//! | **Series**        | Lazy single-pass series, split into two forks.           | [`PowerSeries`]                        |
//! | **Channels**      | One answer per request; close and abandon propagate.     | [`Demand`], [`Supply`], [`Request`]    |
//! | **Coefficients**  | Exact rationals.                                         | [`Coefficient`]                        |
//! | **Runtime**       | Task hosting, teardown with a grace period.              | [`Session`], [`Config`]                |
//! | **Subscriber API**| Observe operator lifecycle and faults.                   | [`Subscribe`], [`Event`]               |
//! | **Errors**        | Typed faults and runtime errors.                         | [`SeriesError`], [`RuntimeError`]      |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use powser::{Coefficient, Config, Session};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = Session::new(Config::default());
//!
//!     // 1/(1−x)² = 1 + 2x + 3x² + …
//!     let mut s = session.ones() * session.ones();
//!     let terms = s.pull_n(4).await?;
//!     assert_eq!(terms, vec![
//!         Coefficient::from_integer(1),
//!         Coefficient::from_integer(2),
//!         Coefficient::from_integer(3),
//!         Coefficient::from_integer(4),
//!     ]);
//!
//!     drop(s);
//!     session.join_idle().await?;
//!     Ok(())
//! }
//! ```
mod channel;
mod coefficient;
mod core;
mod error;
mod events;
mod ops;
mod series;
mod subscribers;

// ---- Public re-exports ----

pub use channel::{ChannelState, Demand, Request, Supply, demand_channel};
pub use coefficient::Coefficient;
pub use core::{AliveTracker, Config, Session, SessionBuilder};
pub use error::{RuntimeError, SeriesError};
pub use events::{Bus, Event, EventKind};
pub use ops::{add, multiply};
pub use series::PowerSeries;
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
