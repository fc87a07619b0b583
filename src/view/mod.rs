//! Mutable views derived from an operation log by replay.
//!
//! - [`update`]: [`GraphUpdate`], property-value changes (consumed by the
//!   repartitioner).
//! - [`modify`]: [`GraphModify`], topology changes (consumed by the
//!   inter-partition applier).

pub mod modify;
pub mod update;

pub use modify::GraphModify;
pub use update::{GraphUpdate, PropIndex, UNSET_SLOT};
