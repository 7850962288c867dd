//! Entity component runtime with incrementally maintained system signatures.

pub use ecs::World;
pub use error::{Error, Result};

pub mod config;
pub mod ecs;
pub mod error;
