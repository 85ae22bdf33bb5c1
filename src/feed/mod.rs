//! Feed module for feedscrew.
//!
//! Provides the feed controller, the jam recovery protocol, and the per-run
//! state they share.

mod builder;
mod controller;
mod history;
mod recovery;
mod state;

pub use builder::FeederBuilder;
pub use controller::{FeedController, FeedReport};
pub use history::{DetectionHistory, HISTORY_CAPACITY};
pub use recovery::{RecoveryProtocol, Segment};
pub use state::{FeedEvent, FeedPhase, RecoveryRecord, RunState};
