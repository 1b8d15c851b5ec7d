//! Delayed tasks keyed by game session
//!
//! Every timer belongs to exactly one session and one task kind. Ending a
//! session cancels all of its timers, so a chain started by an earlier
//! session can never fire into a later one. Time is supplied by the caller
//! in milliseconds (the browser's high resolution clock on the web).

use std::fmt;

/// Identifies one opened game instance, from launch to dismissal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kinds of delayed work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Runner: drop the next obstacle at the right edge
    SpawnObstacle,
    /// Puzzle: move on to the next stanza after the success message
    PuzzleAdvance,
    /// Memory: turn a mismatched pair face down again
    MemoryHide,
    /// Memory: announce that every pair was found
    MemoryComplete,
}

#[derive(Debug, Clone)]
struct Timer {
    session: SessionId,
    kind: TimerKind,
    due_ms: f64,
    /// Insertion order, breaks ties between equal due times
    seq: u64,
}

/// Pending timers for all sessions
#[derive(Debug, Default)]
pub struct Scheduler {
    timers: Vec<Timer>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` for `session` at `now_ms + delay_ms`.
    ///
    /// A session holds at most one timer per kind; scheduling again replaces
    /// the pending one.
    pub fn schedule(&mut self, session: SessionId, kind: TimerKind, now_ms: f64, delay_ms: f64) {
        self.cancel(session, kind);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(Timer {
            session,
            kind,
            due_ms: now_ms + delay_ms.max(0.0),
            seq,
        });
    }

    /// Cancel one pending timer. Returns whether anything was removed.
    pub fn cancel(&mut self, session: SessionId, kind: TimerKind) -> bool {
        let before = self.timers.len();
        self.timers
            .retain(|t| !(t.session == session && t.kind == kind));
        self.timers.len() != before
    }

    /// Cancel every timer owned by `session`
    pub fn cancel_session(&mut self, session: SessionId) {
        let before = self.timers.len();
        self.timers.retain(|t| t.session != session);
        let removed = before - self.timers.len();
        if removed > 0 {
            log::debug!("Cancelled {} timer(s) of session {}", removed, session);
        }
    }

    /// Remove and return every timer due at `now_ms`, earliest first
    pub fn take_due(&mut self, now_ms: f64) -> Vec<(SessionId, TimerKind)> {
        let (mut due, pending): (Vec<Timer>, Vec<Timer>) = self
            .timers
            .drain(..)
            .partition(|t| t.due_ms <= now_ms);
        self.timers = pending;

        due.sort_by(|a, b| {
            a.due_ms
                .partial_cmp(&b.due_ms)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.seq.cmp(&b.seq))
        });
        due.into_iter().map(|t| (t.session, t.kind)).collect()
    }

    /// Earliest pending due time
    pub fn next_due(&self) -> Option<f64> {
        self.timers
            .iter()
            .map(|t| t.due_ms)
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }

    pub fn is_scheduled(&self, session: SessionId, kind: TimerKind) -> bool {
        self.timers
            .iter()
            .any(|t| t.session == session && t.kind == kind)
    }

    /// Number of timers pending for `session`
    pub fn pending(&self, session: SessionId) -> usize {
        self.timers.iter().filter(|t| t.session == session).count()
    }
}
