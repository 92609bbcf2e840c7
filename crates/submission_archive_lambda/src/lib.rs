//! Lambda-facing adapters and handlers for the submission archive pipeline.
//!
//! This crate owns runtime integration details (capability traits, the HTTP
//! backed clients, configuration and logging) and the pipeline itself. AWS
//! SDK clients are wired in the `submission_handler` binary.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod logging;
