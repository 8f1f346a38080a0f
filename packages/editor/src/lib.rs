//! # Editor Session Manager
//!
//! Live, multi-block editing sessions over the persisted block model.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ SessionRegistry: one session per            │
//! │ (theme, user), create-on-first-use          │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ EditorSession: apply / undo / redo          │
//! │  - validates targets, snapshots prev/new    │
//! │  - mutates the persisted BlockStore         │
//! │  - bounded history (50 entries)             │
//! │  - broadcasts every accepted operation      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ Broadcaster: fire-and-forget theme events   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core principles
//!
//! 1. **The store is the source of truth**: sessions are transient and
//!    reconstructible; losing one loses undo/redo memory, never data.
//! 2. **Snapshot-based inversion**: every history entry carries before/after
//!    state sufficient to invert or re-apply it, no algebraic inverses.
//! 3. **Last write wins**: no cross-session locking; concurrent edits of the
//!    same block race, by design.
//! 4. **Exhausted undo/redo is a no-op**, not an error: both return
//!    `Ok(None)` when there is nothing left to traverse.

mod broadcast;
mod history;
mod operations;
mod session;

pub use broadcast::{Broadcaster, EventBus, EventName, NullBroadcaster, RecordingBroadcaster, ThemeEvent};
pub use history::{History, HistoryEntry, Operation, Snapshot, HISTORY_CAP};
pub use operations::{BlockChanges, EditOperation, NewBlock};
pub use session::{EditorSession, SessionKey, SessionRegistry};
