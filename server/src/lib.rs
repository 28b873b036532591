//! # Simulator Relay
//!
//! Bridges browser-based simulator testers to a single-threaded game host.
//! Any number of browser sessions post inputs over HTTP; the host consumes
//! them once per tick on its own thread and broadcasts state back, which the
//! browsers pull by polling.
//!
//! ## Architecture
//!
//! ### Listener Thread
//! A dedicated thread owns a private tokio runtime and an axum router. It only
//! touches two shared structures: it pushes raw bodies into the inbound queue
//! and reads deltas from the outbound log.
//!
//! ### Tick Side
//! The host calls [`Relay::tick`] once per frame. The [`RelayProcessor`]
//! drains the inbound queue, maintains the [`SessionRegistry`] and delivers
//! roster and input events to the host's [`EventSink`]. The registry and the
//! sink are never touched from the listener thread.
//!
//! ### Broadcast Log
//! [`OutboundLog`] keeps the newest 500 broadcasts, each with an id from a
//! single monotonic counter. Browsers poll `GET /api/events?since=<cursor>`
//! and advance their cursor to the returned `last_id`.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use simrelay::{Relay, RelayConfig, RelayEvent};
//! use std::time::Duration;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut relay = Relay::start(&RelayConfig::default())?;
//!     let mut events: Vec<RelayEvent> = Vec::new();
//!
//!     loop {
//!         relay.tick(&mut events);
//!         for event in events.drain(..) {
//!             // Echo every input back to the browsers
//!             if let RelayEvent::Input(input) = event {
//!                 relay.broadcast(input);
//!             }
//!         }
//!         std::thread::sleep(Duration::from_millis(16));
//!     }
//! }
//! ```

pub mod assets;
pub mod config;
pub mod error;
pub mod inbound;
pub mod outbound;
pub mod processor;
pub mod registry;
mod relay;
pub mod transport;

pub use config::{Args, AssetConfig, RelayConfig};
pub use error::RelayError;
pub use outbound::OutboundLog;
pub use processor::{EventSink, RelayEvent, RelayProcessor, TickSummary};
pub use registry::SessionRegistry;
pub use relay::Relay;
