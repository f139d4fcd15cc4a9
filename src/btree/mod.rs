//! # B+Tree Index
//!
//! Disk-backed B+tree keyed by the row id. Each node occupies exactly one
//! pager page; internal nodes partition their children by maximum key and
//! leaves chain left-to-right for sequential scans. Page 0 is always the
//! root: splitting the root copies it aside rather than moving it.
//!
//! Layout lives in [`leaf`] and [`interior`] as borrowing views over raw
//! page buffers; [`tree`] owns the algorithms; [`cursor`] is a plain
//! (page, cell) position resolved through the pager at access time.

mod cursor;
mod interior;
mod leaf;
mod node;
mod tree;

pub use cursor::Cursor;
pub use interior::{InteriorHeader, InteriorNode, InteriorNodeMut};
pub use leaf::{LeafHeader, LeafNode, LeafNodeMut};
pub use node::NodeType;
pub use tree::{BTree, InsertOutcome};
