//! HTTP handlers, one module per resource family.

pub mod expense;
pub mod pod;
pub mod resource;
