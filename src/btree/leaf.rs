//! # Leaf Node Layout
//!
//! A leaf page holds sorted key→row cells plus a pointer to its right
//! sibling:
//!
//! ```text
//! Offset  Size  Field
//! 0       1     node_type (1 = leaf)
//! 1       1     is_root
//! 2       4     parent page
//! 6       4     num_cells
//! 10      4     next_leaf (0 = rightmost; page 0 is always the root, so 0
//!               can never name a sibling)
//! 14      ...   cells: key (4) + row (293) each, 13 max
//! ```
//!
//! `LeafNode` / `LeafNodeMut` are thin borrowing views over a page buffer,
//! validated once at construction. All cell access is bounds-checked against
//! `num_cells`, except the write path helpers (`set_cell_raw`, shifts) which
//! check against the physical capacity because insertion writes one past the
//! current count by design.

use eyre::{ensure, Result};
use zerocopy::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::config::{
    LEAF_NODE_CELL_SIZE, LEAF_NODE_HEADER_SIZE, LEAF_NODE_KEY_SIZE, LEAF_NODE_MAX_CELLS,
    PAGE_SIZE, ROW_SIZE,
};
use crate::record::Row;

use super::node::NodeType;

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct LeafHeader {
    node_type: u8,
    is_root: u8,
    parent: U32,
    num_cells: U32,
    next_leaf: U32,
}

const _: () = assert!(
    size_of::<LeafHeader>() == LEAF_NODE_HEADER_SIZE,
    "LeafHeader drifted from the declared header size"
);

impl LeafHeader {
    zerocopy_accessors! {
        parent: u32,
        num_cells: u32,
        next_leaf: u32,
    }

    pub fn is_root(&self) -> bool {
        self.is_root != 0
    }

    pub fn set_is_root(&mut self, is_root: bool) {
        self.is_root = is_root as u8;
    }
}

#[derive(Debug)]
pub struct LeafNode<'a> {
    data: &'a [u8],
}

pub struct LeafNodeMut<'a> {
    data: &'a mut [u8],
}

fn cell_offset(index: usize) -> usize {
    LEAF_NODE_HEADER_SIZE + index * LEAF_NODE_CELL_SIZE
}

impl<'a> LeafNode<'a> {
    pub fn from_page(data: &'a [u8]) -> Result<Self> {
        ensure!(
            data.len() == PAGE_SIZE,
            "invalid page size: {} != {}",
            data.len(),
            PAGE_SIZE
        );
        ensure!(
            NodeType::of_page(data)? == NodeType::Leaf,
            "expected leaf node page"
        );
        Ok(Self { data })
    }

    fn header(&self) -> &LeafHeader {
        LeafHeader::ref_from_bytes(&self.data[..LEAF_NODE_HEADER_SIZE]).unwrap()
    }

    pub fn is_root(&self) -> bool {
        self.header().is_root()
    }

    pub fn parent(&self) -> u32 {
        self.header().parent()
    }

    pub fn num_cells(&self) -> u32 {
        self.header().num_cells()
    }

    pub fn next_leaf(&self) -> u32 {
        self.header().next_leaf()
    }

    pub fn key_at(&self, index: usize) -> Result<u32> {
        self.check_index(index)?;
        let off = cell_offset(index);
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.data[off..off + LEAF_NODE_KEY_SIZE]);
        Ok(u32::from_le_bytes(bytes))
    }

    /// The serialized row slot of a cell.
    pub fn value_at(&self, index: usize) -> Result<&'a [u8]> {
        self.check_index(index)?;
        let off = cell_offset(index) + LEAF_NODE_KEY_SIZE;
        Ok(&self.data[off..off + ROW_SIZE])
    }

    /// Raw key+row bytes of a cell, used when redistributing cells in a split.
    pub fn cell_at(&self, index: usize) -> Result<&'a [u8]> {
        self.check_index(index)?;
        let off = cell_offset(index);
        Ok(&self.data[off..off + LEAF_NODE_CELL_SIZE])
    }

    /// Binary search for the first cell with key >= target. Returns the cell
    /// index, or `num_cells` when every present key is smaller.
    pub fn find_slot(&self, key: u32) -> Result<usize> {
        let mut lo = 0usize;
        let mut hi = self.num_cells() as usize;

        while lo < hi {
            let mid = (lo + hi) / 2;
            if self.key_at(mid)? >= key {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }

        Ok(lo)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        ensure!(
            index < self.num_cells() as usize,
            "leaf cell index {} out of bounds (num_cells={})",
            index,
            self.num_cells()
        );
        Ok(())
    }
}

impl<'a> LeafNodeMut<'a> {
    pub fn from_page(data: &'a mut [u8]) -> Result<Self> {
        ensure!(
            data.len() == PAGE_SIZE,
            "invalid page size: {} != {}",
            data.len(),
            PAGE_SIZE
        );
        ensure!(
            NodeType::of_page(data)? == NodeType::Leaf,
            "expected leaf node page"
        );
        Ok(Self { data })
    }

    /// Stamps a fresh (or recycled root) page as an empty non-root leaf.
    pub fn init(data: &'a mut [u8]) -> Result<Self> {
        ensure!(
            data.len() == PAGE_SIZE,
            "invalid page size: {} != {}",
            data.len(),
            PAGE_SIZE
        );

        let header = LeafHeader {
            node_type: NodeType::Leaf as u8,
            is_root: 0,
            parent: U32::new(0),
            num_cells: U32::new(0),
            next_leaf: U32::new(0),
        };
        data[..LEAF_NODE_HEADER_SIZE].copy_from_slice(header.as_bytes());

        Ok(Self { data })
    }

    pub fn as_ref(&self) -> LeafNode<'_> {
        LeafNode { data: self.data }
    }

    fn header_mut(&mut self) -> &mut LeafHeader {
        LeafHeader::mut_from_bytes(&mut self.data[..LEAF_NODE_HEADER_SIZE]).unwrap()
    }

    pub fn num_cells(&self) -> u32 {
        self.as_ref().num_cells()
    }

    pub fn set_is_root(&mut self, is_root: bool) {
        self.header_mut().set_is_root(is_root);
    }

    pub fn set_parent(&mut self, parent: u32) {
        self.header_mut().set_parent(parent);
    }

    pub fn set_num_cells(&mut self, num_cells: u32) {
        self.header_mut().set_num_cells(num_cells);
    }

    pub fn set_next_leaf(&mut self, next_leaf: u32) {
        self.header_mut().set_next_leaf(next_leaf);
    }

    /// Writes key + serialized row at `index`, which may be one slot past the
    /// current cell count but never past the physical capacity.
    pub fn write_cell(&mut self, index: usize, key: u32, row: &Row) -> Result<()> {
        ensure!(
            index < LEAF_NODE_MAX_CELLS,
            "leaf cell index {} exceeds capacity {}",
            index,
            LEAF_NODE_MAX_CELLS
        );

        let off = cell_offset(index);
        self.data[off..off + LEAF_NODE_KEY_SIZE].copy_from_slice(&key.to_le_bytes());
        row.serialize(&mut self.data[off + LEAF_NODE_KEY_SIZE..off + LEAF_NODE_CELL_SIZE])
    }

    /// Copies raw key+row bytes into a cell slot.
    pub fn write_cell_raw(&mut self, index: usize, cell: &[u8]) -> Result<()> {
        ensure!(
            index < LEAF_NODE_MAX_CELLS,
            "leaf cell index {} exceeds capacity {}",
            index,
            LEAF_NODE_MAX_CELLS
        );
        ensure!(
            cell.len() == LEAF_NODE_CELL_SIZE,
            "leaf cell has wrong size: {} != {}",
            cell.len(),
            LEAF_NODE_CELL_SIZE
        );

        let off = cell_offset(index);
        self.data[off..off + LEAF_NODE_CELL_SIZE].copy_from_slice(cell);
        Ok(())
    }

    /// Inserts a cell at `index`, shifting later cells right by one. The
    /// caller has already checked there is room.
    pub fn insert_cell(&mut self, index: usize, key: u32, row: &Row) -> Result<()> {
        let num_cells = self.num_cells() as usize;
        ensure!(
            num_cells < LEAF_NODE_MAX_CELLS,
            "leaf is full ({} cells)",
            num_cells
        );
        ensure!(
            index <= num_cells,
            "leaf insert index {} out of bounds (num_cells={})",
            index,
            num_cells
        );

        if index < num_cells {
            let src = cell_offset(index);
            let end = cell_offset(num_cells);
            self.data
                .copy_within(src..end, src + LEAF_NODE_CELL_SIZE);
        }

        self.write_cell(index, key, row)?;
        self.set_num_cells(num_cells as u32 + 1);
        Ok(())
    }
}
