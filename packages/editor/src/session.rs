//! Editing sessions and the per-(theme, user) registry.

use crate::broadcast::{Broadcaster, EventName, ThemeEvent};
use crate::history::{History, HistoryEntry, Operation, Snapshot};
use crate::operations::{self, BlockChanges, EditOperation, NewBlock};
use blockpress_common::CoreError;
use blockpress_model::{Block, BlockPosition, BlockStore};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

fn positions_of(blocks: &[Block]) -> Vec<BlockPosition> {
    blocks
        .iter()
        .map(|b| BlockPosition {
            block_id: b.id.clone(),
            parent_id: b.parent_id.clone(),
            order: b.order,
        })
        .collect()
}

/// One user's live editing session over one theme.
///
/// The session validates and applies operations against the store, records
/// them in its bounded history, and announces every accepted change on the
/// theme's channel. Sessions are transient: dropping one loses its
/// undo/redo memory, never persisted data.
pub struct EditorSession {
    theme_id: String,
    user_id: String,
    store: Arc<dyn BlockStore>,
    broadcaster: Arc<dyn Broadcaster>,
    history: History,
}

impl EditorSession {
    pub fn new(
        theme_id: impl Into<String>,
        user_id: impl Into<String>,
        store: Arc<dyn BlockStore>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Self {
        Self {
            theme_id: theme_id.into(),
            user_id: user_id.into(),
            store,
            broadcaster,
            history: History::new(),
        }
    }

    pub fn theme_id(&self) -> &str {
        &self.theme_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    fn emit(&self, name: EventName, payload: Value) {
        self.broadcaster.broadcast_to_theme(
            &self.theme_id,
            ThemeEvent {
                name,
                user_id: self.user_id.clone(),
                payload,
            },
        );
    }

    fn existing(&self, block_id: &str) -> Result<Block, CoreError> {
        self.store
            .get_block(block_id)?
            .ok_or_else(|| CoreError::not_found("block", block_id))
    }

    /// A valid nesting target: an existing container block that is not the
    /// moved block itself or one of its descendants.
    fn validate_parent(&self, moved: &Block, parent_id: &str) -> Result<(), CoreError> {
        if parent_id == moved.id {
            return Err(CoreError::validation("a block cannot contain itself"));
        }
        let parent = self.existing(parent_id)?;
        if !parent.block_type.is_container() {
            return Err(CoreError::validation(format!(
                "block '{}' ({}) is not a container",
                parent.id,
                parent.block_type.as_str()
            )));
        }
        let subtree = operations::collect_subtree(self.store.as_ref(), moved)?;
        if subtree.iter().any(|b| b.id == parent_id) {
            return Err(CoreError::validation(
                "a block cannot be nested under its own descendant",
            ));
        }
        Ok(())
    }

    /// Apply one editing operation.
    ///
    /// Returns the recorded history entry, or `None` for broadcast-only
    /// changes (unsaved reorders and inline edits).
    pub fn apply(&mut self, operation: EditOperation) -> Result<Option<HistoryEntry>, CoreError> {
        debug!(
            theme = %self.theme_id,
            user = %self.user_id,
            op = ?operation,
            "applying operation"
        );
        match operation {
            EditOperation::Add(new_block) => self.apply_add(new_block).map(Some),
            EditOperation::Remove { block_id } => self.apply_remove(&block_id).map(Some),
            EditOperation::Move {
                block_id,
                new_parent_id,
                new_index,
            } => self
                .apply_move(&block_id, new_parent_id.as_deref(), new_index)
                .map(Some),
            EditOperation::Update { block_id, changes } => {
                self.apply_update(&block_id, &changes).map(Some)
            }
            EditOperation::Duplicate { block_id } => self.apply_duplicate(&block_id).map(Some),
            EditOperation::Reorder {
                page_id,
                ordered_ids,
                save,
            } => self.apply_reorder(&page_id, &ordered_ids, save),
            EditOperation::InlineEdit {
                block_id,
                prop,
                value,
                save,
            } => self.apply_inline_edit(&block_id, &prop, value, save),
        }
    }

    fn apply_add(&mut self, new_block: NewBlock) -> Result<HistoryEntry, CoreError> {
        let id = self.store.next_block_id();
        let siblings = operations::scope_blocks(
            self.store.as_ref(),
            &new_block.page_id,
            new_block.parent_id.as_deref(),
        )?;

        let block = Block {
            id: id.clone(),
            page_id: new_block.page_id,
            block_type: new_block.block_type,
            props: new_block.props,
            link: new_block.link,
            visibility: new_block.visibility,
            animation: new_block.animation,
            order: siblings.len() as i32,
            parent_id: new_block.parent_id,
        };
        if let Some(parent_id) = block.parent_id.clone() {
            self.validate_parent(&block, &parent_id)?;
        }
        self.store.insert_block(block.clone())?;

        let entry = self
            .history
            .push(
                Operation::Add,
                id.as_str(),
                None,
                Some(Snapshot::Block(Box::new(block.clone()))),
            )
            .clone();
        self.emit(EventName::BlockAdded, json!({ "block": block }));
        Ok(entry)
    }

    fn apply_remove(&mut self, block_id: &str) -> Result<HistoryEntry, CoreError> {
        let block = self.existing(block_id)?;
        let subtree = operations::collect_subtree(self.store.as_ref(), &block)?;
        operations::delete_subtree(self.store.as_ref(), &subtree)?;

        let entry = self
            .history
            .push(
                Operation::Remove,
                block_id,
                Some(Snapshot::Blocks(subtree)),
                None,
            )
            .clone();
        self.emit(EventName::BlockRemoved, json!({ "blockId": block_id }));
        Ok(entry)
    }

    fn apply_move(
        &mut self,
        block_id: &str,
        new_parent_id: Option<&str>,
        new_index: usize,
    ) -> Result<HistoryEntry, CoreError> {
        let block = self.existing(block_id)?;
        if let Some(parent_id) = new_parent_id {
            self.validate_parent(&block, parent_id)?;
        }

        let old_parent = block.parent_id.clone();
        let same_scope = old_parent.as_deref() == new_parent_id;
        let old_scope =
            operations::scope_blocks(self.store.as_ref(), &block.page_id, old_parent.as_deref())?;

        let mut previous = positions_of(&old_scope);
        let mut target_scope = if same_scope {
            old_scope.clone()
        } else {
            let new_scope =
                operations::scope_blocks(self.store.as_ref(), &block.page_id, new_parent_id)?;
            previous.extend(positions_of(&new_scope));
            new_scope
        };

        // Build the rearranged scopes, then densify and persist as one batch.
        let mut remaining: Vec<Block> = old_scope.into_iter().filter(|b| b.id != block.id).collect();
        if same_scope {
            target_scope = std::mem::take(&mut remaining);
        }
        let index = new_index.min(target_scope.len());
        let mut moved = block.clone();
        moved.parent_id = new_parent_id.map(str::to_string);
        target_scope.insert(index, moved);

        let mut updates = Vec::new();
        for (order, sibling) in remaining.iter().enumerate() {
            updates.push(BlockPosition {
                block_id: sibling.id.clone(),
                parent_id: old_parent.clone(),
                order: order as i32,
            });
        }
        for (order, sibling) in target_scope.iter().enumerate() {
            updates.push(BlockPosition {
                block_id: sibling.id.clone(),
                parent_id: sibling.parent_id.clone(),
                order: order as i32,
            });
        }
        self.store.update_positions(&updates)?;

        let entry = self
            .history
            .push(
                Operation::Move,
                block_id,
                Some(Snapshot::Positions(previous)),
                Some(Snapshot::Positions(updates)),
            )
            .clone();
        self.emit(
            EventName::BlockMoved,
            json!({ "blockId": block_id, "parentId": new_parent_id, "index": index }),
        );
        Ok(entry)
    }

    fn apply_update(
        &mut self,
        block_id: &str,
        changes: &BlockChanges,
    ) -> Result<HistoryEntry, CoreError> {
        let before = self.existing(block_id)?;
        let after = changes.apply_to(&before);
        self.store.update_block(after.clone())?;

        let entry = self
            .history
            .push(
                Operation::Update,
                block_id,
                Some(Snapshot::Block(Box::new(before))),
                Some(Snapshot::Block(Box::new(after.clone()))),
            )
            .clone();
        self.emit(EventName::BlockUpdated, json!({ "block": after }));
        Ok(entry)
    }

    fn apply_duplicate(&mut self, block_id: &str) -> Result<HistoryEntry, CoreError> {
        let source = self.existing(block_id)?;
        let subtree = operations::collect_subtree(self.store.as_ref(), &source)?;

        let id_map: HashMap<String, String> = subtree
            .iter()
            .map(|b| (b.id.clone(), self.store.next_block_id()))
            .collect();

        let copies: Vec<Block> = subtree
            .iter()
            .map(|original| {
                let mut copy = original.clone();
                copy.id = id_map[&original.id].clone();
                if original.id == source.id {
                    // The copy lands directly after its source.
                    copy.order = source.order + 1;
                } else if let Some(parent) = &original.parent_id {
                    copy.parent_id = Some(
                        id_map
                            .get(parent)
                            .cloned()
                            .unwrap_or_else(|| parent.clone()),
                    );
                }
                copy
            })
            .collect();

        operations::shift_scope(
            self.store.as_ref(),
            &source.page_id,
            source.parent_id.as_deref(),
            source.order + 1,
            1,
            &[],
        )?;
        for copy in &copies {
            self.store.insert_block(copy.clone())?;
        }

        let root_id = id_map[&source.id].clone();
        let root = copies[0].clone();
        let entry = self
            .history
            .push(
                Operation::Duplicate,
                root_id.as_str(),
                None,
                Some(Snapshot::Blocks(copies)),
            )
            .clone();
        self.emit(
            EventName::BlockDuplicated,
            json!({ "sourceId": block_id, "block": root }),
        );
        Ok(entry)
    }

    fn apply_reorder(
        &mut self,
        page_id: &str,
        ordered_ids: &[String],
        save: bool,
    ) -> Result<Option<HistoryEntry>, CoreError> {
        if !save {
            // Drag preview: other editors see it, nothing persists.
            self.emit(
                EventName::BlocksReordered,
                json!({ "pageId": page_id, "orderedIds": ordered_ids, "saved": false }),
            );
            return Ok(None);
        }

        let top_level = operations::scope_blocks(self.store.as_ref(), page_id, None)?;
        if ordered_ids.len() != top_level.len()
            || !top_level
                .iter()
                .all(|b| ordered_ids.contains(&b.id))
        {
            return Err(CoreError::validation(format!(
                "reorder of page '{page_id}' must list exactly its top-level blocks"
            )));
        }

        let previous = positions_of(&top_level);
        let updates: Vec<BlockPosition> = ordered_ids
            .iter()
            .enumerate()
            .map(|(order, id)| BlockPosition {
                block_id: id.clone(),
                parent_id: None,
                order: order as i32,
            })
            .collect();
        self.store.update_positions(&updates)?;

        let entry = self
            .history
            .push(
                Operation::Reorder,
                page_id,
                Some(Snapshot::Positions(previous)),
                Some(Snapshot::Positions(updates)),
            )
            .clone();
        self.emit(
            EventName::BlocksReordered,
            json!({ "pageId": page_id, "orderedIds": ordered_ids, "saved": true }),
        );
        Ok(Some(entry))
    }

    fn apply_inline_edit(
        &mut self,
        block_id: &str,
        prop: &str,
        value: Value,
        save: bool,
    ) -> Result<Option<HistoryEntry>, CoreError> {
        if !save {
            // Live typing: forwarded but not yet committed.
            self.emit(
                EventName::InlineEdit,
                json!({ "blockId": block_id, "prop": prop, "value": value, "saved": false }),
            );
            return Ok(None);
        }

        let before = self.existing(block_id)?;
        let mut after = before.clone();
        after.props.insert(prop.to_string(), value.clone());
        self.store.update_block(after.clone())?;

        // Committed inline edits are plain prop updates to the history.
        let entry = self
            .history
            .push(
                Operation::Update,
                block_id,
                Some(Snapshot::Block(Box::new(before))),
                Some(Snapshot::Block(Box::new(after))),
            )
            .clone();
        self.emit(
            EventName::InlineEdit,
            json!({ "blockId": block_id, "prop": prop, "value": value, "saved": true }),
        );
        Ok(Some(entry))
    }

    /// Revert the most recent recorded operation. `Ok(None)` when the
    /// history is exhausted.
    pub fn undo(&mut self) -> Result<Option<HistoryEntry>, CoreError> {
        let Some(entry) = self.history.undo_entry() else {
            return Ok(None);
        };
        if let Err(error) = operations::invert_entry(self.store.as_ref(), &entry) {
            // The store rejected the inversion; put the cursor back.
            self.history.redo_entry();
            return Err(error);
        }
        self.emit(
            EventName::Undone,
            json!({ "operation": entry.operation, "blockId": entry.block_id }),
        );
        Ok(Some(entry))
    }

    /// Re-apply the most recently undone operation. `Ok(None)` when there
    /// is nothing to redo.
    pub fn redo(&mut self) -> Result<Option<HistoryEntry>, CoreError> {
        let Some(entry) = self.history.redo_entry() else {
            return Ok(None);
        };
        if let Err(error) = operations::reapply_entry(self.store.as_ref(), &entry) {
            self.history.undo_entry();
            return Err(error);
        }
        self.emit(
            EventName::Redone,
            json!({ "operation": entry.operation, "blockId": entry.block_id }),
        );
        Ok(Some(entry))
    }
}

/// Identifies one user's session on one theme.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub theme_id: String,
    pub user_id: String,
}

/// Create-on-first-use registry of live sessions.
///
/// Each (theme, user) pair owns an independent history; users editing the
/// same theme share the store and the broadcast channel, nothing else.
pub struct SessionRegistry {
    store: Arc<dyn BlockStore>,
    broadcaster: Arc<dyn Broadcaster>,
    sessions: Mutex<HashMap<SessionKey, Arc<Mutex<EditorSession>>>>,
}

impl SessionRegistry {
    pub fn new(store: Arc<dyn BlockStore>, broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self {
            store,
            broadcaster,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch the session for a (theme, user) pair, creating it on first use.
    pub fn session(&self, theme_id: &str, user_id: &str) -> Arc<Mutex<EditorSession>> {
        let key = SessionKey {
            theme_id: theme_id.to_string(),
            user_id: user_id.to_string(),
        };
        let mut sessions = self.sessions.lock().expect("registry lock poisoned");
        sessions
            .entry(key)
            .or_insert_with(|| {
                Arc::new(Mutex::new(EditorSession::new(
                    theme_id,
                    user_id,
                    Arc::clone(&self.store),
                    Arc::clone(&self.broadcaster),
                )))
            })
            .clone()
    }

    /// Drop a session, discarding its undo/redo memory.
    pub fn close(&self, theme_id: &str, user_id: &str) -> bool {
        let key = SessionKey {
            theme_id: theme_id.to_string(),
            user_id: user_id.to_string(),
        };
        let mut sessions = self.sessions.lock().expect("registry lock poisoned");
        sessions.remove(&key).is_some()
    }

    pub fn active_count(&self) -> usize {
        self.sessions.lock().expect("registry lock poisoned").len()
    }
}
