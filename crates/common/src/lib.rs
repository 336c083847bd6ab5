//! Shared plumbing for the player service crates.

pub mod context;
pub mod types;
pub mod utils;

pub use context::{ContextError, RequestContext};
