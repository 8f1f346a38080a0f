//! Editing operations and their snapshot-based inversion.

use crate::history::{HistoryEntry, Operation, Snapshot};
use blockpress_common::CoreError;
use blockpress_model::{Animation, Block, BlockPosition, BlockStore, BlockType, Visibility};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payload for creating a block. The id and order are assigned by the
/// session: new blocks land at the end of their (page, parent) scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBlock {
    pub page_id: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    #[serde(default)]
    pub props: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// Partial update applied to an existing block. `props` entries are merged
/// into the block's props; a `null` value removes the key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,
}

/// One editing request as submitted by a client.
///
/// `Reorder` and `InlineEdit` carry a `save` flag: when false the change is
/// broadcast to other editors but neither persisted nor recorded, matching
/// drag previews and live typing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EditOperation {
    Add(NewBlock),
    Remove {
        block_id: String,
    },
    Move {
        block_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new_parent_id: Option<String>,
        new_index: usize,
    },
    Update {
        block_id: String,
        changes: BlockChanges,
    },
    Duplicate {
        block_id: String,
    },
    Reorder {
        page_id: String,
        ordered_ids: Vec<String>,
        #[serde(default)]
        save: bool,
    },
    InlineEdit {
        block_id: String,
        prop: String,
        value: Value,
        #[serde(default)]
        save: bool,
    },
}

impl BlockChanges {
    /// Apply this change set to a copy of `block`.
    pub fn apply_to(&self, block: &Block) -> Block {
        let mut next = block.clone();
        if let Some(props) = &self.props {
            for (key, value) in props {
                if value.is_null() {
                    next.props.remove(key);
                } else {
                    next.props.insert(key.clone(), value.clone());
                }
            }
        }
        if let Some(link) = &self.link {
            next.link = Some(link.clone());
        }
        if let Some(visibility) = &self.visibility {
            next.visibility = visibility.clone();
        }
        if let Some(animation) = &self.animation {
            next.animation = Some(animation.clone());
        }
        next
    }
}

/// Blocks of one (page, parent) scope, in order.
pub(crate) fn scope_blocks(
    store: &dyn BlockStore,
    page_id: &str,
    parent_id: Option<&str>,
) -> Result<Vec<Block>, CoreError> {
    Ok(store
        .page_blocks(page_id)?
        .into_iter()
        .filter(|b| b.parent_id.as_deref() == parent_id)
        .collect())
}

/// A block and all its descendants, root first, children in order.
pub(crate) fn collect_subtree(
    store: &dyn BlockStore,
    root: &Block,
) -> Result<Vec<Block>, CoreError> {
    let page = store.page_blocks(&root.page_id)?;
    let mut subtree = vec![root.clone()];
    let mut frontier = 0;
    while frontier < subtree.len() {
        let parent_id = subtree[frontier].id.clone();
        for block in &page {
            if block.parent_id.as_deref() == Some(parent_id.as_str()) {
                subtree.push(block.clone());
            }
        }
        frontier += 1;
    }
    Ok(subtree)
}

/// Shift every block of a scope whose order satisfies `from` by `delta`,
/// leaving ids in `skip` untouched.
pub(crate) fn shift_scope(
    store: &dyn BlockStore,
    page_id: &str,
    parent_id: Option<&str>,
    from: i32,
    delta: i32,
    skip: &[&str],
) -> Result<(), CoreError> {
    let updates: Vec<BlockPosition> = scope_blocks(store, page_id, parent_id)?
        .into_iter()
        .filter(|b| b.order >= from && !skip.contains(&b.id.as_str()))
        .map(|b| BlockPosition {
            block_id: b.id,
            parent_id: b.parent_id,
            order: b.order + delta,
        })
        .collect();
    store.update_positions(&updates)
}

fn subtree_root(blocks: &[Block]) -> Result<&Block, CoreError> {
    blocks
        .first()
        .ok_or_else(|| CoreError::validation("history snapshot holds no blocks"))
}

/// Re-insert a removed subtree: siblings at and after the root's old slot
/// move down one, then the stored blocks return verbatim.
fn restore_subtree(store: &dyn BlockStore, blocks: &[Block]) -> Result<(), CoreError> {
    let root = subtree_root(blocks)?;
    shift_scope(
        store,
        &root.page_id,
        root.parent_id.as_deref(),
        root.order,
        1,
        &[],
    )?;
    for block in blocks {
        store.insert_block(block.clone())?;
    }
    Ok(())
}

/// Delete a stored subtree and close the gap its root leaves behind.
pub(crate) fn delete_subtree(store: &dyn BlockStore, blocks: &[Block]) -> Result<(), CoreError> {
    let root = subtree_root(blocks)?;
    let page_id = root.page_id.clone();
    let parent_id = root.parent_id.clone();
    let order = root.order;
    for block in blocks {
        store.delete_block(&block.id)?;
    }
    shift_scope(store, &page_id, parent_id.as_deref(), order + 1, -1, &[])
}

fn malformed(entry: &HistoryEntry) -> CoreError {
    CoreError::validation(format!(
        "history entry {} ({:?}) carries an unexpected snapshot shape",
        entry.id, entry.operation
    ))
}

/// Revert the effect of a history entry on the store.
pub(crate) fn invert_entry(store: &dyn BlockStore, entry: &HistoryEntry) -> Result<(), CoreError> {
    match entry.operation {
        Operation::Add => match &entry.new_state {
            // Additions append at the end of their scope, so deletion
            // leaves no gap to close.
            Some(Snapshot::Block(block)) => store.delete_block(&block.id),
            _ => Err(malformed(entry)),
        },
        Operation::Duplicate => match &entry.new_state {
            Some(Snapshot::Blocks(copies)) => delete_subtree(store, copies),
            _ => Err(malformed(entry)),
        },
        Operation::Remove => match &entry.previous_state {
            Some(Snapshot::Blocks(removed)) => restore_subtree(store, removed),
            _ => Err(malformed(entry)),
        },
        Operation::Update => match &entry.previous_state {
            Some(Snapshot::Block(before)) => store.update_block((**before).clone()),
            _ => Err(malformed(entry)),
        },
        Operation::Move | Operation::Reorder => match &entry.previous_state {
            Some(Snapshot::Positions(before)) => store.update_positions(before),
            _ => Err(malformed(entry)),
        },
    }
}

/// Re-apply a previously undone history entry.
pub(crate) fn reapply_entry(store: &dyn BlockStore, entry: &HistoryEntry) -> Result<(), CoreError> {
    match entry.operation {
        Operation::Add => match &entry.new_state {
            Some(Snapshot::Block(block)) => store.insert_block((**block).clone()),
            _ => Err(malformed(entry)),
        },
        Operation::Duplicate => match &entry.new_state {
            Some(Snapshot::Blocks(copies)) => restore_subtree(store, copies),
            _ => Err(malformed(entry)),
        },
        Operation::Remove => match &entry.previous_state {
            Some(Snapshot::Blocks(removed)) => delete_subtree(store, removed),
            _ => Err(malformed(entry)),
        },
        Operation::Update => match &entry.new_state {
            Some(Snapshot::Block(after)) => store.update_block((**after).clone()),
            _ => Err(malformed(entry)),
        },
        Operation::Move | Operation::Reorder => match &entry.new_state {
            Some(Snapshot::Positions(after)) => store.update_positions(after),
            _ => Err(malformed(entry)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockpress_model::MemoryBlockStore;
    use serde_json::json;

    #[test]
    fn changes_merge_props_and_null_removes() {
        let block = Block::new("b1", "p1", BlockType::Hero)
            .with_prop("title", json!("Old"))
            .with_prop("subtitle", json!("Keep"));

        let changes = BlockChanges {
            props: Some(
                [
                    ("title".to_string(), json!("New")),
                    ("subtitle".to_string(), Value::Null),
                ]
                .into_iter()
                .collect(),
            ),
            link: Some("/shop".to_string()),
            ..Default::default()
        };

        let next = changes.apply_to(&block);
        assert_eq!(next.props["title"], "New");
        assert!(!next.props.contains_key("subtitle"));
        assert_eq!(next.link.as_deref(), Some("/shop"));
        // Untouched fields survive.
        assert_eq!(next.visibility, block.visibility);
    }

    #[test]
    fn subtree_collects_nested_children() {
        let store = MemoryBlockStore::new();
        let row = Block::new("row", "p1", BlockType::Row);
        store.insert_block(row.clone()).unwrap();
        store
            .insert_block(Block::new("btn", "p1", BlockType::Button).with_parent("row"))
            .unwrap();
        store
            .insert_block(
                Block::new("inner", "p1", BlockType::Row)
                    .with_parent("row")
                    .with_order(1),
            )
            .unwrap();
        store
            .insert_block(Block::new("deep", "p1", BlockType::Card).with_parent("inner"))
            .unwrap();
        store
            .insert_block(Block::new("other", "p1", BlockType::Hero).with_order(1))
            .unwrap();

        let ids: Vec<String> = collect_subtree(&store, &row)
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec!["row", "btn", "inner", "deep"]);
    }

    #[test]
    fn operation_serde_uses_op_tag() {
        let op = EditOperation::Remove {
            block_id: "b1".to_string(),
        };
        let value = serde_json::to_value(&op).unwrap();
        assert_eq!(value["op"], "remove");
        assert_eq!(value["blockId"], "b1");

        // Struct-variant fields use the wire casing too.
        let reorder = EditOperation::Reorder {
            page_id: "p1".to_string(),
            ordered_ids: vec!["b2".to_string(), "b1".to_string()],
            save: true,
        };
        let value = serde_json::to_value(&reorder).unwrap();
        assert_eq!(value["op"], "reorder");
        assert_eq!(value["pageId"], "p1");
        assert_eq!(value["orderedIds"][0], "b2");

        let parsed: EditOperation = serde_json::from_value(json!({
            "op": "add",
            "pageId": "p1",
            "type": "hero"
        }))
        .unwrap();
        assert!(matches!(
            parsed,
            EditOperation::Add(NewBlock { ref page_id, .. }) if page_id == "p1"
        ));
    }
}
