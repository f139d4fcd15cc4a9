//! Node type tag shared by the leaf and internal page layouts. The tag is the
//! first byte of every page; an unknown value means the page was never
//! initialized as a node (or the file is corrupt), which is fatal.

use eyre::{bail, Result};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Internal = 0,
    Leaf = 1,
}

impl NodeType {
    pub fn from_byte(b: u8) -> Result<Self> {
        match b {
            0 => Ok(NodeType::Internal),
            1 => Ok(NodeType::Leaf),
            _ => bail!("invalid node type byte: {:#04x}", b),
        }
    }

    /// Reads the tag out of a raw page buffer.
    pub fn of_page(page: &[u8]) -> Result<Self> {
        Self::from_byte(page[0])
    }
}
