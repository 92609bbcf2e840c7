//! Shared submission archive domain primitives.
//!
//! This crate owns the notification contract, the uniform stage result shape
//! and storage key derivation. It intentionally excludes AWS SDK, HTTP and
//! Lambda runtime concerns.

pub mod contract;
pub mod storage_keys;
