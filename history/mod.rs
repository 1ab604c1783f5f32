/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Linear undo/redo history: an ordered log of snapshots plus a cursor.
//!
//! The log entry at the cursor is the state currently on screen. Committing
//! while the cursor sits behind the tail discards the redo branch — this is
//! a linear timeline, not a tree.

pub mod debounce;

use log::debug;

/// Maximum number of snapshots retained; oldest entries are trimmed first.
pub const MAX_HISTORY_ENTRIES: usize = 128;

/// Editing vs replaying, as an explicit mode rather than a side flag.
///
/// Commits are suppressed while `Replaying` so undo/redo transitions never
/// pollute the log with entries of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    #[default]
    Editing,
    Replaying,
}

/// Ordered snapshot log with a cursor into it.
///
/// Invariants: the log is never empty, and the cursor is always a valid
/// index. Snapshots are owned values with no aliasing back into live state;
/// callers deep-copy on both commit and replay.
#[derive(Debug, Clone)]
pub struct HistoryLog<T: Clone> {
    entries: Vec<T>,
    cursor: usize,
}

impl<T: Clone> HistoryLog<T> {
    /// Create a log whose single entry is the initial (baseline) snapshot.
    pub fn new(initial: T) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
        }
    }

    /// Commit a new snapshot after the cursor, discarding any redo branch.
    pub fn commit(&mut self, snapshot: T) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);
        self.cursor += 1;

        if self.entries.len() > MAX_HISTORY_ENTRIES {
            let excess = self.entries.len() - MAX_HISTORY_ENTRIES;
            self.entries.drain(0..excess);
            self.cursor -= excess;
        }
    }

    /// Step the cursor back and return the snapshot to restore.
    pub fn undo(&mut self) -> Option<&T> {
        if self.cursor == 0 {
            debug!("undo requested at history floor; ignoring");
            return None;
        }
        self.cursor -= 1;
        Some(&self.entries[self.cursor])
    }

    /// Step the cursor forward and return the snapshot to restore.
    pub fn redo(&mut self) -> Option<&T> {
        if self.cursor + 1 >= self.entries.len() {
            debug!("redo requested at history tail; ignoring");
            return None;
        }
        self.cursor += 1;
        Some(&self.entries[self.cursor])
    }

    /// Replace the whole log with a new single-entry baseline (load/clear).
    pub fn reset(&mut self, baseline: T) {
        self.entries.clear();
        self.entries.push(baseline);
        self.cursor = 0;
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Number of snapshots in the log.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current cursor index.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Snapshot at the cursor (the state currently on screen).
    pub fn current(&self) -> &T {
        &self.entries[self.cursor]
    }
}
