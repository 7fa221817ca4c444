//! multipart-relay accepts multipart HTTP requests, pulls out the single
//! JSON section they carry, and forwards that JSON to one or more
//! downstream endpoints. The first truthy element of each endpoint's JSON
//! array answer is collected, and the caller receives those answers as a
//! JSON array in endpoint order.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, validate, health).
//! - [`config`] -- Endpoint list model and validation.
//! - [`daemon`] -- Background execution and PID file lifecycle.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`health`] -- `GET /health` endpoint handler returning runtime diagnostics.
//! - [`logging`] -- Structured tracing setup for stdout or a log file.
//! - [`relay`] -- Core pipeline: multipart decoding, JSON extraction,
//!   concurrent fan-out to endpoints, and answer aggregation.
//! - [`server`] -- Axum server setup, shared application state, HTTP client, and
//!   graceful shutdown.
//!
//! # Status codes
//!
//! | Outcome | Status |
//! |---------|--------|
//! | at least one endpoint answered | `200` with a JSON array |
//! | body is not multipart | `400` |
//! | no usable JSON section | `400` |
//! | no endpoint produced an answer | `500` |

// Binary crate — public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod daemon;
pub mod error;
pub mod health;
pub mod logging;
pub mod relay;
pub mod server;
