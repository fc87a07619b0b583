//! Append-only operation log addressed by [`LogPosition`].
//!
//! Every [`OpLog`] gets a process-unique [`LogId`] at construction, and a
//! generation counter that [`OpLog::clear`] bumps. A [`LogPosition`] carries
//! both, so a position handed out by one log (or by an earlier generation of
//! the same log) is recognized as stale instead of silently reading
//! whatever now sits at that index.
//!
//! Appends take `&mut self`: concurrent producers must serialize through a
//! lock or a single writer, which is what fixes the total order replay
//! relies on. Reads of already-appended positions only need `&self`.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use graphlog_storage::{StorageRegistry, Uri};
use tracing::{error, warn};

use crate::error::OpLogError;
use crate::oplog::types::Operation;

static NEXT_LOG_ID: AtomicU64 = AtomicU64::new(0);

static INVALID_OP: Operation = Operation::Invalid;

// ---------------------------------------------------------------------------
// LogId / LogPosition
// ---------------------------------------------------------------------------

/// Process-unique identity of one [`OpLog`] instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogId(u64);

impl LogId {
    fn next() -> Self {
        Self(NEXT_LOG_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "log{}", self.0)
    }
}

/// The place an operation was appended at, bound to the log that issued it.
///
/// Positions from the same log generation are ordered by index; positions
/// from different logs or generations are incomparable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LogPosition {
    log: LogId,
    generation: u32,
    index: u64,
}

impl LogPosition {
    /// 0-based index of the operation within its log.
    #[must_use]
    pub const fn index(self) -> u64 {
        self.index
    }

    /// The log that issued this position.
    #[must_use]
    pub const fn log_id(self) -> LogId {
        self.log
    }

    /// How many times the issuing log had been cleared when this was issued.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Whether both positions were issued by the same log generation.
    #[must_use]
    pub fn same_origin(self, other: Self) -> bool {
        self.log == other.log && self.generation == other.generation
    }

    /// The position at `index` in this position's log generation.
    pub(crate) const fn with_index(self, index: u64) -> Self {
        Self { index, ..self }
    }
}

impl PartialOrd for LogPosition {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.same_origin(*other)
            .then(|| self.index.cmp(&other.index))
    }
}

impl fmt::Display for LogPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}@{}", self.log, self.generation, self.index)
    }
}

// ---------------------------------------------------------------------------
// OpLog
// ---------------------------------------------------------------------------

/// An ordered, append-only sequence of [`Operation`]s.
///
/// No validation happens on append; replay is where unsupported or
/// malformed sequences are rejected.
#[derive(Debug)]
pub struct OpLog {
    id: LogId,
    generation: u32,
    ops: Vec<Operation>,
}

impl OpLog {
    /// An empty in-memory log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: LogId::next(),
            generation: 0,
            ops: Vec::new(),
        }
    }

    /// Open a log persisted at `uri`.
    ///
    /// The backend for `uri` is resolved first so routing problems surface
    /// as storage errors, but durable logs are not implemented: this always
    /// fails with [`OpLogError::PersistenceUnimplemented`].
    ///
    /// # Errors
    /// Always returns an error.
    pub fn open(storage: &StorageRegistry, uri: &Uri) -> Result<Self, OpLogError> {
        let backend = storage.resolve(uri)?;
        error!(%uri, scheme = backend.uri_scheme(), "persistent log not yet implemented");
        Err(OpLogError::PersistenceUnimplemented {
            uri: uri.to_string(),
        })
    }

    /// This log's identity.
    #[must_use]
    pub const fn id(&self) -> LogId {
        self.id
    }

    /// Append `op`, returning its position. The index equals the prior length.
    pub fn append(&mut self, op: Operation) -> LogPosition {
        let index = self.ops.len() as u64;
        self.ops.push(op);
        self.mint(index)
    }

    /// Read the operation at `pos`.
    ///
    /// A position that is out of range, stale (issued before a
    /// [`clear`](Self::clear)) or issued by another log logs a warning and
    /// yields [`Operation::Invalid`].
    #[must_use]
    pub fn get(&self, pos: LogPosition) -> &Operation {
        self.try_get(pos).unwrap_or_else(|| {
            warn!(
                position = %pos,
                log = %self.id,
                generation = self.generation,
                len = self.ops.len(),
                "log position out of range"
            );
            &INVALID_OP
        })
    }

    /// Read the operation at `pos`, or `None` without logging.
    #[must_use]
    pub fn try_get(&self, pos: LogPosition) -> Option<&Operation> {
        if !self.issued(pos) {
            return None;
        }
        let index = usize::try_from(pos.index).ok()?;
        self.ops.get(index)
    }

    /// Whether `pos` was issued by this log in its current generation.
    #[must_use]
    pub fn issued(&self, pos: LogPosition) -> bool {
        pos.log == self.id && pos.generation == self.generation
    }

    /// The position of the entry at `index`, if it exists.
    #[must_use]
    pub fn position_at(&self, index: u64) -> Option<LogPosition> {
        (index < self.ops.len() as u64).then(|| self.mint(index))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the log has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Drop every entry. All previously issued positions become stale.
    pub fn clear(&mut self) {
        self.ops.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Entries in append order, paired with their positions.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (LogPosition, &Operation)> + '_ {
        self.ops
            .iter()
            .enumerate()
            .map(|(i, op)| (self.mint(i as u64), op))
    }

    const fn mint(&self, index: u64) -> LogPosition {
        LogPosition {
            log: self.id,
            generation: self.generation,
            index,
        }
    }
}

impl Default for OpLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Clones receive a fresh [`LogId`]: positions from the original are not
/// valid in the copy, since the two may diverge.
impl Clone for OpLog {
    fn clone(&self) -> Self {
        Self {
            id: LogId::next(),
            generation: 0,
            ops: self.ops.clone(),
        }
    }
}

impl Extend<Operation> for OpLog {
    fn extend<T: IntoIterator<Item = Operation>>(&mut self, iter: T) {
        self.ops.extend(iter);
    }
}

impl FromIterator<Operation> for OpLog {
    fn from_iter<T: IntoIterator<Item = Operation>>(iter: T) -> Self {
        let mut log = Self::new();
        log.extend(iter);
        log
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
