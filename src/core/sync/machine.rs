//! Sync state machine
//!
//! Pure transition logic for one sync run, with no IO. The engine feeds it
//! events and asks it what to do next:
//!
//! ```text
//!             Stored(id)
//!            +---------+
//!            v         |
//! seed -> Fetching ----+--- Exhausted | NotReady | limit ---> Done --- Committed ---> (terminal)
//!            |                                                 |
//!            +--- FetchFailed | SinkFailed | Cancelled ---> Failed <--- CommitFailed
//! ```
//!
//! `Done` with at least one delivery is not terminal until the checkpoint
//! commit has been resolved.

use crate::domain::errors::{Failure, FailureKind};
use crate::domain::ids::{Cursor, ReportId};
use std::fmt;

/// Why a run finished successfully
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoneReason {
    /// The source has nothing new yet
    Exhausted,
    /// The next report is still being generated
    NotReady,
    /// The per-run report limit was reached
    LimitReached,
}

impl DoneReason {
    /// Returns the reason as a snake_case label
    pub fn as_str(&self) -> &'static str {
        match self {
            DoneReason::Exhausted => "exhausted",
            DoneReason::NotReady => "not_ready",
            DoneReason::LimitReached => "limit_reached",
        }
    }
}

impl fmt::Display for DoneReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current state of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    /// Next step is a fetch after `cursor`
    Fetching { cursor: Cursor },
    /// No more fetching this run
    Done(DoneReason),
    /// The run failed; no checkpoint is written
    Failed(Failure),
}

/// Something that happened during the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A delivered report reached the sink
    Stored(ReportId),
    /// The sink rejected a delivered report
    SinkFailed(String),
    /// Source signalled exhaustion
    Exhausted,
    /// Source signalled the next report is not ready
    NotReady,
    /// Source failed
    FetchFailed(Failure),
    /// The run deadline passed or a shutdown was requested
    Cancelled(String),
    /// The checkpoint commit succeeded
    Committed,
    /// The checkpoint commit failed
    CommitFailed(String),
}

/// State machine for one sync run
#[derive(Debug, Clone)]
pub struct SyncMachine {
    state: SyncState,
    seed: Cursor,
    last_delivered: Option<Cursor>,
    delivered: usize,
    limit: Option<usize>,
    committed: bool,
}

impl SyncMachine {
    /// Start a run at `seed`, optionally stopping after `limit` reports
    pub fn new(seed: Cursor, limit: Option<usize>) -> Self {
        let state = if limit == Some(0) {
            SyncState::Done(DoneReason::LimitReached)
        } else {
            SyncState::Fetching {
                cursor: seed.clone(),
            }
        };

        Self {
            state,
            seed,
            last_delivered: None,
            delivered: 0,
            limit,
            committed: false,
        }
    }

    /// Current state
    pub fn state(&self) -> &SyncState {
        &self.state
    }

    /// Cursor the run started from
    pub fn seed(&self) -> &Cursor {
        &self.seed
    }

    /// Number of reports stored so far
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// Whether the checkpoint was committed
    pub fn committed(&self) -> bool {
        self.committed
    }

    /// Cursor to fetch after, while in `Fetching`
    pub fn fetch_cursor(&self) -> Option<&Cursor> {
        match &self.state {
            SyncState::Fetching { cursor } => Some(cursor),
            _ => None,
        }
    }

    /// Cursor to commit, if a commit is due
    ///
    /// `Some` only in `Done` after at least one delivery and before the
    /// commit has been resolved.
    pub fn commit_target(&self) -> Option<&Cursor> {
        match self.state {
            SyncState::Done(_) if !self.committed => self.last_delivered.as_ref(),
            _ => None,
        }
    }

    /// Cursor the checkpoint holds once the run is over
    pub fn resume_cursor(&self) -> &Cursor {
        if self.committed {
            self.last_delivered.as_ref().unwrap_or(&self.seed)
        } else {
            &self.seed
        }
    }

    /// True once no further events are accepted
    pub fn is_terminal(&self) -> bool {
        match self.state {
            SyncState::Fetching { .. } => false,
            SyncState::Done(_) => self.commit_target().is_none(),
            SyncState::Failed(_) => true,
        }
    }

    /// Final result, once terminal
    pub fn outcome(&self) -> Option<Result<DoneReason, &Failure>> {
        if !self.is_terminal() {
            return None;
        }
        match &self.state {
            SyncState::Done(reason) => Some(Ok(*reason)),
            SyncState::Failed(failure) => Some(Err(failure)),
            SyncState::Fetching { .. } => None,
        }
    }

    /// Apply an event; events that do not fit the current state are ignored
    ///
    /// Returns true if the event changed the machine.
    pub fn apply(&mut self, event: SyncEvent) -> bool {
        let fetching = matches!(self.state, SyncState::Fetching { .. });
        let commit_pending = self.commit_target().is_some();

        let next = match event {
            SyncEvent::Stored(id) if fetching => {
                let cursor = Cursor::after(&id);
                self.delivered += 1;
                self.last_delivered = Some(cursor.clone());
                match self.limit {
                    Some(limit) if self.delivered >= limit => {
                        SyncState::Done(DoneReason::LimitReached)
                    }
                    _ => SyncState::Fetching { cursor },
                }
            }
            SyncEvent::Exhausted if fetching => SyncState::Done(DoneReason::Exhausted),
            SyncEvent::NotReady if fetching => SyncState::Done(DoneReason::NotReady),
            SyncEvent::FetchFailed(failure) if fetching => SyncState::Failed(failure),
            SyncEvent::SinkFailed(message) if fetching => {
                SyncState::Failed(Failure::new(FailureKind::Sink, message))
            }
            SyncEvent::Cancelled(message) if fetching => {
                SyncState::Failed(Failure::new(FailureKind::Cancelled, message))
            }
            SyncEvent::Committed if commit_pending => {
                self.committed = true;
                return true;
            }
            SyncEvent::CommitFailed(message) if commit_pending => {
                SyncState::Failed(Failure::new(FailureKind::Persistence, message))
            }
            event => {
                tracing::trace!(state = ?self.state, event = ?event, "Ignoring event");
                return false;
            }
        };

        self.state = next;
        true
    }
}
