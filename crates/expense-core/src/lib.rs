//! Gateway operations and the Solid client port.
//!
//! This crate defines the `PodClient` trait that the infrastructure layer
//! implements, and the `ExpenseService` that turns REST operations into
//! pod calls. It depends only on `expense-types` -- never on
//! `expense-infra` or any HTTP crate.

pub mod pod;
pub mod service;
