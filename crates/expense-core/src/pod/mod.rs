//! Solid client port.
//!
//! `PodClient` is the contract the gateway needs from a Solid client:
//! typed reads and writes keyed by URI plus a raw `send` primitive.

pub mod box_client;
pub mod client;

pub use box_client::BoxPodClient;
pub use client::PodClient;
