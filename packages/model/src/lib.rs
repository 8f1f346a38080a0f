//! # Block Model
//!
//! Typed data model for block-based themes: a Theme owns ordered Pages,
//! a Page owns ordered Blocks, and a Block carries a closed `type`
//! discriminant plus loosely-validated props.
//!
//! Pure data, no behavior beyond structural helpers. Persistence is behind
//! the [`BlockStore`] trait; the theme catalog behind [`ThemeCatalog`].
//! In-memory implementations of both are provided for tests and tooling.

pub mod block;
pub mod catalog;
pub mod store;
pub mod theme;

pub use block::{densify_orders, Animation, Block, BlockPosition, BlockType, Visibility};
pub use catalog::{CatalogEntry, MemoryCatalog, ThemeCatalog};
pub use store::{BlockStore, MemoryBlockStore};
pub use theme::{Borders, Colors, Layout, MergeMode, Page, Settings, Spacing, Theme, Typography};
