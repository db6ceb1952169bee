//! State management module.
//!
//! Contains the [`StateTracker`] and the snapshot types it hands out.

mod snapshot;
mod tracker;

pub use snapshot::{Member, Room};
pub use tracker::StateTracker;
