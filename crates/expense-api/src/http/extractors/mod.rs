//! Request parameter extraction and validation.

pub mod query;
pub mod upload;
