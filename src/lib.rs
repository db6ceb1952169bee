//! slirc-client - Straylight IRC client library
//!
//! An async IRC client core: one [`Client`] per server connection, an event
//! dispatcher that runs handlers per verb, and a tracker that keeps a
//! picture of the rooms we are in and who is in them.
//!
//! ```no_run
//! use slirc_client::{Client, ClientConfig};
//! use slirc_client::slirc_proto::{Line, verbs};
//!
//! # async fn run() -> slirc_client::Result<()> {
//! let mut config = ClientConfig::new("straylight");
//! config.server = "irc.libera.chat".into();
//! config.tls = true;
//!
//! let client = Client::new(config);
//! let _ = client.handle(verbs::CONNECTED, |client: Client, _line: Line| async move {
//!     client.join("#straylight").await;
//! });
//! let _ = client.command("!hello", |client: Client, line: Line| async move {
//!     client.privmsg(line.target(), "hi").await;
//! });
//! client.connect().await?;
//! # Ok(())
//! # }
//! ```
//!
//! Wire traffic, lifecycle and state anomalies are reported through
//! `tracing`; see [`telemetry::init_tracing`]. Prometheus counters are
//! available once [`metrics::init`] has been called.

pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
mod handlers;
pub mod metrics;
pub mod state;
pub mod telemetry;

pub use config::{ClientConfig, Hooks};
pub use connection::{Client, Phase};
pub use dispatch::{Handler, HandlerPanic, Remover};
pub use error::{ClientError, Result};
pub use state::{Member, Room, StateTracker};

pub use slirc_proto;
