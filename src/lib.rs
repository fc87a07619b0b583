//! graphlog library crate.
//!
//! Records property-graph mutations in an append-only [`OpLog`] and replays
//! them into the change sets a repartitioning step consumes. The `graphlog`
//! binary is a thin driver over these modules.
//!
//! [`OpLog`]: oplog::OpLog

pub mod config;
pub mod error;
pub mod graph;
pub mod model;
pub mod oplog;
pub mod telemetry;
pub mod view;

pub use graphlog_storage as storage;
