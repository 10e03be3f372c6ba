//! Shared error definitions used across the chefjunior crates.

pub mod error;

pub use error::{Error, FromMessage, Result};
