//! Undo/Redo History
//!
//! A bounded snapshot stack with a cursor. Snapshots are full copies of
//! the node and derived connection sets, captured before every
//! locally-initiated mutation (never for remotely-received ones).
//!
//! Pushing truncates any "future" (redo) entries beyond the cursor; when
//! the cap is exceeded the oldest entry is evicted first. `undo` moves
//! the cursor back and returns the snapshot now under it; the caller
//! captures the pre-undo state and pushes it afterwards so `redo` can
//! recover the position actually being left.

use crate::client::graph::Edge;
use crate::shared::model::Node;

/// Maximum number of retained snapshots
pub const HISTORY_CAP: usize = 50;

/// A captured copy of the full node and connection set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub nodes: Vec<Node>,
    pub connections: Vec<Edge>,
}

/// Bounded sequential snapshot list with a cursor.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Snapshot>,
    cursor: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(Snapshot::default())
    }
}

impl History {
    /// Start a history at an initial snapshot.
    pub fn new(initial: Snapshot) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
        }
    }

    /// The snapshot currently under the cursor.
    pub fn current(&self) -> &Snapshot {
        &self.entries[self.cursor]
    }

    /// Push a snapshot: truncate the redo tail, append, evict the oldest
    /// entry beyond the cap, and advance the cursor (capped at cap-1).
    pub fn push_state(&mut self, snapshot: Snapshot) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);
        if self.entries.len() > HISTORY_CAP {
            self.entries.remove(0);
        }
        self.cursor = (self.cursor + 1).min(HISTORY_CAP - 1);
    }

    /// Step back one snapshot, if not already at the beginning.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.cursor > 0 {
            self.cursor -= 1;
            Some(&self.entries[self.cursor])
        } else {
            None
        }
    }

    /// Step forward one snapshot, if not already at the end.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if self.cursor + 1 < self.entries.len() {
            self.cursor += 1;
            Some(&self.entries[self.cursor])
        } else {
            None
        }
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Replace the whole stack with one initial snapshot (a different map
    /// was opened).
    pub fn reset(&mut self, initial: Snapshot) {
        self.entries = vec![initial];
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}
