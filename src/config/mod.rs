//! Relay configuration.
//!
//! The [`model`] submodule holds the data types, [`validation`] checks them
//! before the server starts. Configuration is immutable once loaded.

pub mod model;
pub mod validation;

pub use model::{Config, Endpoint};
