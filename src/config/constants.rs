//! # Layout Constants
//!
//! Every on-disk size and offset in one place. Constants that derive from one
//! another are co-located and guarded by compile-time assertions so a change
//! to one cannot silently skew the file format.
//!
//! ## Dependency Graph
//!
//! ```text
//! PAGE_SIZE (4096 bytes)
//!       │
//!       ├─> LEAF_NODE_SPACE_FOR_CELLS (PAGE_SIZE - LEAF_NODE_HEADER_SIZE)
//!       │         │
//!       │         └─> LEAF_NODE_MAX_CELLS (space / LEAF_NODE_CELL_SIZE)
//!       │                   │
//!       │                   └─> LEAF_NODE_LEFT/RIGHT_SPLIT_COUNT
//!       │
//!       └─> TABLE_MAX_PAGES (400) bounds the resident footprint at ~1.6 MiB
//!
//! ROW_SIZE (293 bytes)
//!       │
//!       └─> LEAF_NODE_CELL_SIZE (LEAF_NODE_KEY_SIZE + ROW_SIZE)
//! ```
//!
//! The header sizes declared here are tied to `size_of` of the zerocopy
//! structs by assertions in `btree::leaf` and `btree::interior`.

// ============================================================================
// PAGE GEOMETRY
// ============================================================================

/// Size of each database page in bytes. The fundamental unit of I/O.
pub const PAGE_SIZE: usize = 4096;

/// Upper bound on the page table. Pages are never evicted, so this also
/// bounds resident memory at `TABLE_MAX_PAGES * PAGE_SIZE`.
pub const TABLE_MAX_PAGES: usize = 400;

/// Sentinel marking the uninitialized right child of an empty internal node.
/// Page 0 is always the root, so 0 could not serve as the sentinel here the
/// way it does for `next_leaf`.
pub const INVALID_PAGE_NUM: u32 = u32::MAX;

// ============================================================================
// ROW LAYOUT
// Fixed-schema rows: id, username, email. The string slots keep one byte for
// the terminating NUL so a maximum-length value still round-trips.
// ============================================================================

/// Maximum username length in bytes, excluding the NUL.
pub const USERNAME_MAX_LEN: usize = 32;

/// Maximum email length in bytes, excluding the NUL.
pub const EMAIL_MAX_LEN: usize = 255;

pub const ID_SIZE: usize = 4;
pub const USERNAME_SIZE: usize = USERNAME_MAX_LEN + 1;
pub const EMAIL_SIZE: usize = EMAIL_MAX_LEN + 1;

pub const ID_OFFSET: usize = 0;
pub const USERNAME_OFFSET: usize = ID_OFFSET + ID_SIZE;
pub const EMAIL_OFFSET: usize = USERNAME_OFFSET + USERNAME_SIZE;

/// Serialized row size: 4 + 33 + 256 = 293 bytes.
pub const ROW_SIZE: usize = ID_SIZE + USERNAME_SIZE + EMAIL_SIZE;

const _: () = assert!(ROW_SIZE == 293, "ROW_SIZE derivation mismatch");

// ============================================================================
// NODE HEADERS
// Every page starts with the common header; leaf and internal nodes extend
// it with two u32 fields each, so both full headers are the same size.
// ============================================================================

/// node_type (1) + is_root (1) + parent (4).
pub const COMMON_NODE_HEADER_SIZE: usize = 6;

/// Common header + num_cells (4) + next_leaf (4).
pub const LEAF_NODE_HEADER_SIZE: usize = COMMON_NODE_HEADER_SIZE + 4 + 4;

/// Common header + num_keys (4) + right_child (4).
pub const INTERNAL_NODE_HEADER_SIZE: usize = COMMON_NODE_HEADER_SIZE + 4 + 4;

// ============================================================================
// LEAF NODE BODY
// ============================================================================

pub const LEAF_NODE_KEY_SIZE: usize = 4;
pub const LEAF_NODE_CELL_SIZE: usize = LEAF_NODE_KEY_SIZE + ROW_SIZE;
pub const LEAF_NODE_SPACE_FOR_CELLS: usize = PAGE_SIZE - LEAF_NODE_HEADER_SIZE;
pub const LEAF_NODE_MAX_CELLS: usize = LEAF_NODE_SPACE_FOR_CELLS / LEAF_NODE_CELL_SIZE;

/// A splitting leaf distributes its `LEAF_NODE_MAX_CELLS + 1` cells so the
/// left (old) node keeps the extra cell when the total is odd.
pub const LEAF_NODE_RIGHT_SPLIT_COUNT: usize = (LEAF_NODE_MAX_CELLS + 1) / 2;
pub const LEAF_NODE_LEFT_SPLIT_COUNT: usize =
    (LEAF_NODE_MAX_CELLS + 1) - LEAF_NODE_RIGHT_SPLIT_COUNT;

const _: () = assert!(LEAF_NODE_MAX_CELLS == 13, "leaf fanout drifted from the file format");
const _: () = assert!(
    LEAF_NODE_LEFT_SPLIT_COUNT + LEAF_NODE_RIGHT_SPLIT_COUNT == LEAF_NODE_MAX_CELLS + 1,
    "split counts must cover every cell exactly once"
);

// ============================================================================
// INTERNAL NODE BODY
// ============================================================================

pub const INTERNAL_NODE_KEY_SIZE: usize = 4;
pub const INTERNAL_NODE_CHILD_SIZE: usize = 4;
pub const INTERNAL_NODE_CELL_SIZE: usize = INTERNAL_NODE_CHILD_SIZE + INTERNAL_NODE_KEY_SIZE;

/// Kept small so splits are exercised after a handful of leaves. Raising it
/// widens the tree without changing any algorithm.
pub const INTERNAL_NODE_MAX_KEYS: usize = 3;

const _: () = assert!(
    INTERNAL_NODE_HEADER_SIZE + (INTERNAL_NODE_MAX_KEYS + 1) * INTERNAL_NODE_CELL_SIZE
        <= PAGE_SIZE,
    "internal node body must fit in a page"
);
