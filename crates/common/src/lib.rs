//! Context helpers shared by the chatlabs crate error types.

pub mod context;

pub use context::FromMessage;
