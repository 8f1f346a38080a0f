//! # Block Renderer
//!
//! Compiles one block instance plus the active design tokens into a
//! template-language fragment.
//!
//! `render` is a pure function: no I/O, no randomness, byte-identical
//! output for identical input. Blocks whose data only exists at page render
//! time (product/course listings) emit directive markers instead of literal
//! values; the directive resolver in [`directives`] evaluates those against
//! a context object supplied by the page-render-time collaborator.
//!
//! Unknown block types render an inert, clearly marked placeholder so old
//! pages stay renderable after a block type is retired.

pub mod directives;
mod fragments;

pub use directives::{resolve, DirectiveError};
pub use fragments::{escape_html, render, CHILD_SLOT};
