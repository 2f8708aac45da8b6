//! Core constants and error types for the NOMAD platform layer.
//!
//! These are always compiled and shared by every component.

pub mod constants;
mod error;

pub use error::*;
