//! Lockstep Relay
//!
//! The relay is the central hub for Lockstep clients:
//! - Tracks connected clients in a live registry
//! - Rebroadcasts every message to all other connected clients
//! - Answers `ready` with a `sync` reply from a single peer
//!
//! # Example
//!
//! ```no_run
//! use lockstep_relay::{Relay, RelayConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let relay = Relay::new(RelayConfig::default());
//!     relay.serve_websocket("0.0.0.0:3000").await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod registry;
pub mod relay;
pub mod session;

pub use error::{RelayError, Result};
pub use registry::Registry;
pub use relay::{route, Relay, RelayConfig};
pub use session::{Session, SessionId};
