//! Gateway services.

pub mod expense;
