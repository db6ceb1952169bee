//! Integration test common infrastructure.
//!
//! Each test drives a real [`Client`](slirc_client::Client) over an
//! in-memory duplex stream. The other end is a [`TestServer`] that sends
//! raw frames and asserts on what the client writes back.

// Each test binary uses a different subset of the helpers.
#![allow(dead_code)]

pub mod client;
pub mod server;

#[allow(unused_imports)]
pub use client::{connect, registered, test_config};
#[allow(unused_imports)]
pub use server::TestServer;
