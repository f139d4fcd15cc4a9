//! Cursor over the sorted key sequence: a (page, cell) position plus an
//! end-of-table flag. The cursor holds page numbers, never buffer pointers;
//! the page is borrowed from the pager at each access, so a cursor stays
//! cheap to copy and cannot dangle. A cursor is positioned by
//! [`BTree::find`]/[`BTree::start`](super::BTree::start) and should be
//! discarded after any insert, which may shift the cells underneath it.

use eyre::Result;

use super::leaf::LeafNode;
use super::tree::BTree;
use crate::record::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub page_num: u32,
    pub cell_num: u32,
    pub end_of_table: bool,
}

impl Cursor {
    /// Deserializes the row under the cursor. Meaningless once
    /// `end_of_table` is set.
    pub fn row(&self, tree: &mut BTree<'_>) -> Result<Row> {
        let leaf = LeafNode::from_page(tree.pager.page(self.page_num)?)?;
        Row::deserialize(leaf.value_at(self.cell_num as usize)?)
    }

    /// Steps to the next cell, following the leaf chain and setting
    /// `end_of_table` past the rightmost cell.
    pub fn advance(&mut self, tree: &mut BTree<'_>) -> Result<()> {
        let (num_cells, next_leaf) = {
            let leaf = LeafNode::from_page(tree.pager.page(self.page_num)?)?;
            (leaf.num_cells(), leaf.next_leaf())
        };

        self.cell_num += 1;
        if self.cell_num >= num_cells {
            if next_leaf == 0 {
                // That was the rightmost leaf.
                self.end_of_table = true;
            } else {
                self.page_num = next_leaf;
                self.cell_num = 0;
            }
        }

        Ok(())
    }
}
