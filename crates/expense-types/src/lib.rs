//! Shared domain types for the Solid expense gateway.
//!
//! This crate contains the types passed between the gateway layers:
//! the Expense resource, WebID profiles, the low-level pod request/response
//! pair, and the pod error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, chrono, url, bytes, thiserror.

pub mod config;
pub mod error;
pub mod expense;
pub mod pod;
pub mod profile;
