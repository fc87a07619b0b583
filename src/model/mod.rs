//! Data model shared by the log and the derived views.

pub mod address;
pub mod value;

pub use address::{EntityAddress, GlobalNodeId, NewNodeId, UNKNOWN_HOST};
pub use value::PropValue;
