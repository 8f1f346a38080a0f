//! Bounded, linear undo/redo history.
//!
//! Entries carry full before/after snapshots, so undo and redo never have
//! to derive an inverse operation: they replay the stored state. The redo
//! branch is discarded as soon as a new operation lands past the cursor.

use blockpress_model::{Block, BlockPosition};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Oldest entries are evicted past this bound.
pub const HISTORY_CAP: usize = 50;

/// Kind of recorded operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Add,
    Remove,
    Move,
    Update,
    Duplicate,
    Reorder,
}

/// Stored state on one side of a history entry.
///
/// Which shape an operation uses is fixed: `Block` for single-block
/// create/update, `Blocks` for subtree removal and duplication, `Positions`
/// for reorder and reparent batches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum Snapshot {
    Block(Box<Block>),
    Blocks(Vec<Block>),
    Positions(Vec<BlockPosition>),
}

/// One undoable step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: u64,
    pub operation: Operation,
    /// Primary subject: the block id, or the page id for reorders.
    pub block_id: String,
    pub previous_state: Option<Snapshot>,
    pub new_state: Option<Snapshot>,
    pub timestamp: DateTime<Utc>,
}

/// Linear history with a cursor.
///
/// `cursor` points at the entry that undo would revert next; `None` means
/// everything recorded has been undone (or nothing was recorded).
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: Option<usize>,
    next_id: u64,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn can_redo(&self) -> bool {
        let next = self.cursor.map_or(0, |c| c + 1);
        next < self.entries.len()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Record a new entry at the cursor, discarding any redo branch and
    /// evicting the oldest entry when full.
    pub fn push(
        &mut self,
        operation: Operation,
        block_id: impl Into<String>,
        previous_state: Option<Snapshot>,
        new_state: Option<Snapshot>,
    ) -> &HistoryEntry {
        let keep = self.cursor.map_or(0, |c| c + 1);
        self.entries.truncate(keep);

        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(HistoryEntry {
            id,
            operation,
            block_id: block_id.into(),
            previous_state,
            new_state,
            timestamp: Utc::now(),
        });

        if self.entries.len() > HISTORY_CAP {
            self.entries.remove(0);
        }
        self.cursor = Some(self.entries.len() - 1);
        self.entries.last().expect("just pushed")
    }

    /// Step the cursor back, returning the entry to revert.
    pub fn undo_entry(&mut self) -> Option<HistoryEntry> {
        let current = self.cursor?;
        let entry = self.entries[current].clone();
        self.cursor = current.checked_sub(1);
        Some(entry)
    }

    /// Step the cursor forward, returning the entry to re-apply.
    pub fn redo_entry(&mut self) -> Option<HistoryEntry> {
        let next = self.cursor.map_or(0, |c| c + 1);
        if next >= self.entries.len() {
            return None;
        }
        self.cursor = Some(next);
        Some(self.entries[next].clone())
    }
}
