//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - `types`: the serialisable [`ClientConfig`] and its loader
//! - `hooks`: runtime callbacks that cannot live in a file ([`Hooks`])
//! - [`defaults`]: serde default functions

pub mod defaults;
mod hooks;
mod types;

pub use hooks::{ClockFn, Hooks, NewNickFn, RecoverFn};
pub use types::{ClientConfig, ConfigError};
