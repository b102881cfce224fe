//! Shared error helpers used across all msgbridge crates.

pub mod error;

pub use error::FromMessage;
