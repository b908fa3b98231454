//! Crate for reading, writing and merging mapping files.
//!
//! Mappings are read and written in the Tiny v2 (`.tiny`) format, see the [`tiny_v2`] module. Several mappings
//! sharing their first namespace can be merged into one with [`Mappings::merge`][tree::mappings::Mappings::merge].

mod lines;

pub mod tiny_v2;

pub mod tree;
mod action;

pub use action::merge::{ColumnLayout, MergeError, MergeOptions};
