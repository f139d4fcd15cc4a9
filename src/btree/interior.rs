//! # Internal Node Layout
//!
//! An internal page holds sorted (child, key) cells plus a trailing
//! right-child pointer:
//!
//! ```text
//! Offset  Size  Field
//! 0       1     node_type (0 = internal)
//! 1       1     is_root
//! 2       4     parent page
//! 6       4     num_keys
//! 10      4     right_child (INVALID_PAGE_NUM while the node is empty)
//! 14      ...   cells: child (4) + key (4) each, 3 max
//! ```
//!
//! The key at cell `i` is the maximum key reachable through `child[i]`; every
//! key in the right-child subtree is strictly greater than the last cell key.
//!
//! A freshly initialized node carries `INVALID_PAGE_NUM` as its right child:
//! page 0 is the root, so a zeroed right-child field would silently make the
//! node a parent of the root. Reading through the sentinel is fatal.

use eyre::{bail, ensure, Result};
use zerocopy::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::config::{
    INTERNAL_NODE_CELL_SIZE, INTERNAL_NODE_CHILD_SIZE, INTERNAL_NODE_HEADER_SIZE,
    INTERNAL_NODE_MAX_KEYS, INVALID_PAGE_NUM, PAGE_SIZE,
};

use super::node::NodeType;

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct InteriorHeader {
    node_type: u8,
    is_root: u8,
    parent: U32,
    num_keys: U32,
    right_child: U32,
}

const _: () = assert!(
    size_of::<InteriorHeader>() == INTERNAL_NODE_HEADER_SIZE,
    "InteriorHeader drifted from the declared header size"
);

impl InteriorHeader {
    zerocopy_accessors! {
        parent: u32,
        num_keys: u32,
        right_child: u32,
    }

    pub fn is_root(&self) -> bool {
        self.is_root != 0
    }

    pub fn set_is_root(&mut self, is_root: bool) {
        self.is_root = is_root as u8;
    }
}

#[derive(Debug)]
pub struct InteriorNode<'a> {
    data: &'a [u8],
}

pub struct InteriorNodeMut<'a> {
    data: &'a mut [u8],
}

fn cell_offset(index: usize) -> usize {
    INTERNAL_NODE_HEADER_SIZE + index * INTERNAL_NODE_CELL_SIZE
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&data[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}

impl<'a> InteriorNode<'a> {
    pub fn from_page(data: &'a [u8]) -> Result<Self> {
        ensure!(
            data.len() == PAGE_SIZE,
            "invalid page size: {} != {}",
            data.len(),
            PAGE_SIZE
        );
        ensure!(
            NodeType::of_page(data)? == NodeType::Internal,
            "expected internal node page"
        );
        Ok(Self { data })
    }

    fn header(&self) -> &InteriorHeader {
        InteriorHeader::ref_from_bytes(&self.data[..INTERNAL_NODE_HEADER_SIZE]).unwrap()
    }

    pub fn is_root(&self) -> bool {
        self.header().is_root()
    }

    pub fn parent(&self) -> u32 {
        self.header().parent()
    }

    pub fn num_keys(&self) -> u32 {
        self.header().num_keys()
    }

    pub fn right_child(&self) -> u32 {
        self.header().right_child()
    }

    /// Child pointer at `index`. `index == num_keys` names the right child;
    /// anything past that is a corrupt access and fails. So does reading a
    /// child slot still holding the invalid-page sentinel.
    pub fn child_at(&self, index: usize) -> Result<u32> {
        let num_keys = self.num_keys() as usize;

        if index > num_keys {
            bail!(
                "tried to access child {} of internal node with {} keys",
                index,
                num_keys
            );
        }

        let child = if index == num_keys {
            self.right_child()
        } else {
            read_u32(self.data, cell_offset(index))
        };

        if child == INVALID_PAGE_NUM {
            bail!("tried to access child {} of internal node, but it was an invalid page", index);
        }

        Ok(child)
    }

    pub fn key_at(&self, index: usize) -> Result<u32> {
        ensure!(
            index < self.num_keys() as usize,
            "internal key index {} out of bounds (num_keys={})",
            index,
            self.num_keys()
        );
        Ok(read_u32(
            self.data,
            cell_offset(index) + INTERNAL_NODE_CHILD_SIZE,
        ))
    }

    /// Binary search for the index of the child that should contain `key`:
    /// the smallest `i` with `key[i] >= key`, or `num_keys` for the right
    /// child. There is always one more child than keys.
    pub fn find_child(&self, key: u32) -> Result<usize> {
        let mut lo = 0usize;
        let mut hi = self.num_keys() as usize;

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
}

impl<'a> InteriorNodeMut<'a> {
    pub fn from_page(data: &'a mut [u8]) -> Result<Self> {
        ensure!(
            data.len() == PAGE_SIZE,
            "invalid page size: {} != {}",
            data.len(),
            PAGE_SIZE
        );
        ensure!(
            NodeType::of_page(data)? == NodeType::Internal,
            "expected internal node page"
        );
        Ok(Self { data })
    }

    /// Stamps a page as an empty non-root internal node with the sentinel
    /// right child.
    pub fn init(data: &'a mut [u8]) -> Result<Self> {
        ensure!(
            data.len() == PAGE_SIZE,
            "invalid page size: {} != {}",
            data.len(),
            PAGE_SIZE
        );

        let header = InteriorHeader {
            node_type: NodeType::Internal as u8,
            is_root: 0,
            parent: U32::new(0),
            num_keys: U32::new(0),
            right_child: U32::new(INVALID_PAGE_NUM),
        };
        data[..INTERNAL_NODE_HEADER_SIZE].copy_from_slice(header.as_bytes());

        Ok(Self { data })
    }

    pub fn as_ref(&self) -> InteriorNode<'_> {
        InteriorNode { data: self.data }
    }

    fn header_mut(&mut self) -> &mut InteriorHeader {
        InteriorHeader::mut_from_bytes(&mut self.data[..INTERNAL_NODE_HEADER_SIZE]).unwrap()
    }

    pub fn num_keys(&self) -> u32 {
        self.as_ref().num_keys()
    }

    pub fn set_is_root(&mut self, is_root: bool) {
        self.header_mut().set_is_root(is_root);
    }

    pub fn set_parent(&mut self, parent: u32) {
        self.header_mut().set_parent(parent);
    }

    pub fn set_num_keys(&mut self, num_keys: u32) {
        self.header_mut().set_num_keys(num_keys);
    }

    pub fn set_right_child(&mut self, right_child: u32) {
        self.header_mut().set_right_child(right_child);
    }

    /// Writes a (child, key) cell. The slot may be one past the key count
    /// during insertion but never past the configured fanout.
    pub fn set_cell(&mut self, index: usize, child: u32, key: u32) -> Result<()> {
        ensure!(
            index < INTERNAL_NODE_MAX_KEYS + 1,
            "internal cell index {} exceeds capacity {}",
            index,
            INTERNAL_NODE_MAX_KEYS
        );

        let off = cell_offset(index);
        self.data[off..off + 4].copy_from_slice(&child.to_le_bytes());
        self.data[off + 4..off + 8].copy_from_slice(&key.to_le_bytes());
        Ok(())
    }

    pub fn set_key(&mut self, index: usize, key: u32) -> Result<()> {
        ensure!(
            index < self.num_keys() as usize,
            "internal key index {} out of bounds (num_keys={})",
            index,
            self.num_keys()
        );

        let off = cell_offset(index) + INTERNAL_NODE_CHILD_SIZE;
        self.data[off..off + 4].copy_from_slice(&key.to_le_bytes());
        Ok(())
    }

    /// Copies cell `from` into cell `to` wholesale (shift helper).
    pub fn copy_cell(&mut self, from: usize, to: usize) -> Result<()> {
        ensure!(
            from < INTERNAL_NODE_MAX_KEYS + 1 && to < INTERNAL_NODE_MAX_KEYS + 1,
            "internal cell copy {} -> {} exceeds capacity",
            from,
            to
        );

        let src = cell_offset(from);
        let dst = cell_offset(to);
        self.data.copy_within(src..src + INTERNAL_NODE_CELL_SIZE, dst);
        Ok(())
    }
}
