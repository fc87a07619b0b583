//! In-memory operation log and replay.
//!
//! A producer appends [`Operation`]s to an [`OpLog`] in the order it wants
//! them applied. Replay folds the log once, front to back, into the derived
//! views in [`crate::view`].
//!
//! # Modules
//!
//! - [`types`]: [`Opcode`] taxonomy and the [`Operation`] enum with its JSON form
//! - [`log`]: [`OpLog`], [`LogId`] and [`LogPosition`]
//! - [`replay`]: the single-pass fold and its [`FatalPolicy`]

pub mod log;
pub mod replay;
pub mod types;

pub use log::{LogId, LogPosition, OpLog};
pub use replay::{FatalPolicy, Replayer, replay};
pub use types::{Opcode, Operation};
