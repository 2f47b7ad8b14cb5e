//! Infrastructure layer for the Solid expense gateway.
//!
//! Contains implementations of the `PodClient` port defined in
//! `expense-core`: an HTTP client that talks to a real pod through a
//! client-credentials session, and an in-memory pod for local runs and
//! tests. The `rdf` module projects Expenses and WebID profiles to and
//! from the JSON-LD the pod negotiates.

pub mod memory;
pub mod rdf;
pub mod solid;
