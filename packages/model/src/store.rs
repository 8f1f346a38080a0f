//! Persisted block store abstraction.
//!
//! The core treats persistence as a key-value store indexed by block id
//! with an ordering field; it does not depend on any particular backend.
//! [`MemoryBlockStore`] backs tests, the cli, and any embedded use.

use crate::block::{Block, BlockPosition};
use crate::theme::Theme;
use blockpress_common::CoreError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// External collaborator holding persisted blocks.
///
/// Each method is expected to be atomic at the storage layer; in particular
/// `update_positions` applies a reorder batch as one unit.
pub trait BlockStore: Send + Sync {
    fn get_block(&self, id: &str) -> Result<Option<Block>, CoreError>;

    /// Create a block. Fails with `Validation` if the id already exists.
    fn insert_block(&self, block: Block) -> Result<(), CoreError>;

    /// Replace a block. Fails with `NotFound` if the id does not exist.
    fn update_block(&self, block: Block) -> Result<(), CoreError>;

    /// Delete a block. Fails with `NotFound` if the id does not exist.
    fn delete_block(&self, id: &str) -> Result<(), CoreError>;

    /// All blocks of a page, sorted by order.
    fn page_blocks(&self, page_id: &str) -> Result<Vec<Block>, CoreError>;

    /// Apply a batch of position updates as one unit.
    fn update_positions(&self, updates: &[BlockPosition]) -> Result<(), CoreError>;

    /// Mint an id for a block about to be created.
    fn next_block_id(&self) -> String;

    /// Fill a theme's pages with their persisted blocks, ordered by position.
    /// Orders are densified per (page, parent) scope, so a backend holding
    /// sparse orders still hydrates into well-formed pages.
    fn hydrate_theme(&self, theme: &mut Theme) -> Result<(), CoreError> {
        for page in &mut theme.pages {
            page.blocks = self.page_blocks(&page.id)?;
            crate::block::densify_orders(&mut page.blocks);
        }
        Ok(())
    }
}

/// In-memory store with interior mutability, usable behind `Arc`.
#[derive(Default)]
pub struct MemoryBlockStore {
    blocks: Mutex<HashMap<String, Block>>,
    next_id: AtomicU64,
}

impl MemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from a theme's embedded blocks.
    pub fn from_theme(theme: &Theme) -> Self {
        let store = Self::new();
        {
            let mut blocks = store.blocks.lock().expect("store lock poisoned");
            for page in &theme.pages {
                for block in &page.blocks {
                    blocks.insert(block.id.clone(), block.clone());
                }
            }
        }
        store
    }

    pub fn len(&self) -> usize {
        self.blocks.lock().expect("store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every block, sorted by id. For test assertions.
    pub fn all_blocks(&self) -> Vec<Block> {
        let blocks = self.blocks.lock().expect("store lock poisoned");
        let mut all: Vec<Block> = blocks.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }
}

impl BlockStore for MemoryBlockStore {
    fn get_block(&self, id: &str) -> Result<Option<Block>, CoreError> {
        let blocks = self.blocks.lock().expect("store lock poisoned");
        Ok(blocks.get(id).cloned())
    }

    fn insert_block(&self, block: Block) -> Result<(), CoreError> {
        let mut blocks = self.blocks.lock().expect("store lock poisoned");
        if blocks.contains_key(&block.id) {
            return Err(CoreError::validation(format!(
                "block '{}' already exists",
                block.id
            )));
        }
        blocks.insert(block.id.clone(), block);
        Ok(())
    }

    fn update_block(&self, block: Block) -> Result<(), CoreError> {
        let mut blocks = self.blocks.lock().expect("store lock poisoned");
        if !blocks.contains_key(&block.id) {
            return Err(CoreError::not_found("block", &block.id));
        }
        blocks.insert(block.id.clone(), block);
        Ok(())
    }

    fn delete_block(&self, id: &str) -> Result<(), CoreError> {
        let mut blocks = self.blocks.lock().expect("store lock poisoned");
        if blocks.remove(id).is_none() {
            return Err(CoreError::not_found("block", id));
        }
        Ok(())
    }

    fn page_blocks(&self, page_id: &str) -> Result<Vec<Block>, CoreError> {
        let blocks = self.blocks.lock().expect("store lock poisoned");
        let mut page: Vec<Block> = blocks
            .values()
            .filter(|b| b.page_id == page_id)
            .cloned()
            .collect();
        page.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        Ok(page)
    }

    fn update_positions(&self, updates: &[BlockPosition]) -> Result<(), CoreError> {
        let mut blocks = self.blocks.lock().expect("store lock poisoned");

        // Validate the whole batch before touching anything.
        for update in updates {
            if !blocks.contains_key(&update.block_id) {
                return Err(CoreError::not_found("block", &update.block_id));
            }
        }

        for update in updates {
            let block = blocks
                .get_mut(&update.block_id)
                .expect("validated above");
            block.order = update.order;
            block.parent_id = update.parent_id.clone();
        }
        Ok(())
    }

    fn next_block_id(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        format!("blk-{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockType;
    use crate::theme::Page;

    #[test]
    fn insert_get_update_delete() {
        let store = MemoryBlockStore::new();
        let block = Block::new("b1", "p1", BlockType::Hero);

        store.insert_block(block.clone()).unwrap();
        assert!(store.insert_block(block.clone()).is_err());

        let fetched = store.get_block("b1").unwrap().unwrap();
        assert_eq!(fetched, block);

        let mut updated = block.clone();
        updated.order = 5;
        store.update_block(updated).unwrap();
        assert_eq!(store.get_block("b1").unwrap().unwrap().order, 5);

        store.delete_block("b1").unwrap();
        assert!(store.get_block("b1").unwrap().is_none());
        assert!(matches!(
            store.delete_block("b1"),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn page_blocks_are_ordered() {
        let store = MemoryBlockStore::new();
        store
            .insert_block(Block::new("a", "p1", BlockType::Hero).with_order(2))
            .unwrap();
        store
            .insert_block(Block::new("b", "p1", BlockType::Cta).with_order(0))
            .unwrap();
        store
            .insert_block(Block::new("c", "p2", BlockType::Cta).with_order(1))
            .unwrap();

        let ids: Vec<String> = store
            .page_blocks("p1")
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn position_batch_is_all_or_nothing() {
        let store = MemoryBlockStore::new();
        store
            .insert_block(Block::new("a", "p1", BlockType::Hero).with_order(0))
            .unwrap();

        let updates = vec![
            BlockPosition {
                block_id: "a".to_string(),
                parent_id: None,
                order: 9,
            },
            BlockPosition {
                block_id: "missing".to_string(),
                parent_id: None,
                order: 1,
            },
        ];
        assert!(store.update_positions(&updates).is_err());

        // First entry must not have been applied.
        assert_eq!(store.get_block("a").unwrap().unwrap().order, 0);
    }

    #[test]
    fn hydrate_fills_pages_with_dense_orders() {
        let store = MemoryBlockStore::new();
        // Sparse orders, as a backend might hold after external edits.
        store
            .insert_block(Block::new("a", "p1", BlockType::Hero).with_order(3))
            .unwrap();
        store
            .insert_block(Block::new("b", "p1", BlockType::Cta).with_order(7))
            .unwrap();
        store
            .insert_block(Block::new("c", "p2", BlockType::Button).with_order(5))
            .unwrap();

        let mut theme = Theme {
            id: "t1".to_string(),
            name: "Aurora".to_string(),
            slug: "aurora".to_string(),
            settings: crate::theme::Settings::default(),
            custom_css: None,
            pages: vec![
                Page {
                    id: "p1".to_string(),
                    name: "Home".to_string(),
                    slug: "home".to_string(),
                    is_home_page: true,
                    blocks: Vec::new(),
                },
                Page {
                    id: "p2".to_string(),
                    name: "About".to_string(),
                    slug: "about".to_string(),
                    is_home_page: false,
                    blocks: Vec::new(),
                },
            ],
            is_active: false,
            is_default: false,
            owner_id: None,
        };

        store.hydrate_theme(&mut theme).unwrap();

        let home: Vec<(&str, i32)> = theme.pages[0]
            .blocks
            .iter()
            .map(|b| (b.id.as_str(), b.order))
            .collect();
        assert_eq!(home, vec![("a", 0), ("b", 1)]);
        assert_eq!(theme.pages[1].blocks[0].order, 0);
    }

    #[test]
    fn minted_ids_are_unique() {
        let store = MemoryBlockStore::new();
        let a = store.next_block_id();
        let b = store.next_block_id();
        assert_ne!(a, b);
    }
}
