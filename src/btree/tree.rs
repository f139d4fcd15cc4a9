//! # B+Tree Operations
//!
//! Search, insertion, and the split machinery over pager-resident nodes. All
//! data lives in leaf cells; internal nodes hold (child, key) separators where
//! the key at cell `i` equals the maximum key in `child[i]`'s subtree. Leaves
//! are chained left-to-right through `next_leaf` for sequential scans.
//!
//! ## Insert Path
//!
//! ```text
//! insert(row)
//!   └─ find(key)                 descend separator keys to a leaf
//!       └─ leaf_insert           room left: shift cells, write
//!           └─ leaf_split_and_insert        full leaf
//!               ├─ create_new_root          old leaf was the root
//!               └─ internal_node_insert     otherwise, register new leaf
//!                   └─ internal_node_split_and_insert   full parent, and
//!                       so on up the tree
//! ```
//!
//! The root never moves: splitting it copies its contents into a fresh "left
//! child" page and rewrites page 0 as a two-child internal node, so page 0
//! stays the root for the lifetime of the file.
//!
//! ## Borrowing
//!
//! `BTree` borrows the pager for the duration of one operation. Node views
//! are re-acquired from the pager at every step instead of being held across
//! mutations, which is what makes the split paths (which touch two or three
//! pages in alternation) expressible without aliasing.

use eyre::{ensure, Result};

use super::cursor::Cursor;
use super::interior::{InteriorNode, InteriorNodeMut};
use super::leaf::{LeafNode, LeafNodeMut};
use super::node::NodeType;
use crate::config::{
    INTERNAL_NODE_MAX_KEYS, INVALID_PAGE_NUM, LEAF_NODE_CELL_SIZE, LEAF_NODE_KEY_SIZE,
    LEAF_NODE_LEFT_SPLIT_COUNT, LEAF_NODE_MAX_CELLS, LEAF_NODE_RIGHT_SPLIT_COUNT,
};
use crate::record::Row;
use crate::storage::{PageBuf, Pager};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    DuplicateKey,
}

#[derive(Debug)]
pub struct BTree<'a> {
    pub(crate) pager: &'a mut Pager,
    root_page_num: u32,
}

impl<'a> BTree<'a> {
    pub fn new(pager: &'a mut Pager, root_page_num: u32) -> Self {
        Self {
            pager,
            root_page_num,
        }
    }

    pub fn root_page_num(&self) -> u32 {
        self.root_page_num
    }

    fn node_type(&mut self, page_num: u32) -> Result<NodeType> {
        NodeType::of_page(self.pager.page(page_num)?)
    }

    fn node_parent(&mut self, page_num: u32) -> Result<u32> {
        let page = self.pager.page(page_num)?;
        match NodeType::of_page(page)? {
            NodeType::Leaf => Ok(LeafNode::from_page(page)?.parent()),
            NodeType::Internal => Ok(InteriorNode::from_page(page)?.parent()),
        }
    }

    fn set_node_parent(&mut self, page_num: u32, parent: u32) -> Result<()> {
        let page = self.pager.page_mut(page_num)?;
        match NodeType::of_page(page)? {
            NodeType::Leaf => LeafNodeMut::from_page(page)?.set_parent(parent),
            NodeType::Internal => InteriorNodeMut::from_page(page)?.set_parent(parent),
        }
        Ok(())
    }

    /// Largest key in the subtree rooted at `page_num`: the last cell of its
    /// rightmost leaf.
    pub fn max_key(&mut self, mut page_num: u32) -> Result<u32> {
        loop {
            match self.node_type(page_num)? {
                NodeType::Leaf => {
                    let leaf = LeafNode::from_page(self.pager.page(page_num)?)?;
                    let num_cells = leaf.num_cells();
                    ensure!(num_cells > 0, "max key of empty leaf page {}", page_num);
                    return leaf.key_at(num_cells as usize - 1);
                }
                NodeType::Internal => {
                    let node = InteriorNode::from_page(self.pager.page(page_num)?)?;
                    let right = node.right_child();
                    ensure!(
                        right != INVALID_PAGE_NUM,
                        "max key through invalid right child of page {}",
                        page_num
                    );
                    page_num = right;
                }
            }
        }
    }

    /// Positions a cursor at the first cell with key >= `key` (possibly one
    /// past the last cell of the covering leaf). Does not set `end_of_table`.
    pub fn find(&mut self, key: u32) -> Result<Cursor> {
        let mut page_num = self.root_page_num;

        loop {
            match self.node_type(page_num)? {
                NodeType::Internal => {
                    let node = InteriorNode::from_page(self.pager.page(page_num)?)?;
                    let child_index = node.find_child(key)?;
                    page_num = node.child_at(child_index)?;
                }
                NodeType::Leaf => {
                    let leaf = LeafNode::from_page(self.pager.page(page_num)?)?;
                    let cell_num = leaf.find_slot(key)? as u32;
                    return Ok(Cursor {
                        page_num,
                        cell_num,
                        end_of_table: false,
                    });
                }
            }
        }
    }

    /// Cursor at the smallest key in the table. `end_of_table` is set when
    /// the table holds no rows at all.
    pub fn start(&mut self) -> Result<Cursor> {
        let mut cursor = self.find(0)?;

        let leaf = LeafNode::from_page(self.pager.page(cursor.page_num)?)?;
        cursor.end_of_table = leaf.num_cells() == 0;

        Ok(cursor)
    }

    /// Inserts a row keyed by its id, rejecting duplicates before any page is
    /// touched.
    pub fn insert(&mut self, row: &Row) -> Result<InsertOutcome> {
        let key = row.id;
        let cursor = self.find(key)?;

        let duplicate = {
            let leaf = LeafNode::from_page(self.pager.page(cursor.page_num)?)?;
            cursor.cell_num < leaf.num_cells() && leaf.key_at(cursor.cell_num as usize)? == key
        };
        if duplicate {
            return Ok(InsertOutcome::DuplicateKey);
        }

        self.leaf_insert(&cursor, key, row)?;
        Ok(InsertOutcome::Inserted)
    }

    fn leaf_insert(&mut self, cursor: &Cursor, key: u32, row: &Row) -> Result<()> {
        let num_cells =
            LeafNode::from_page(self.pager.page(cursor.page_num)?)?.num_cells() as usize;

        if num_cells >= LEAF_NODE_MAX_CELLS {
            return self.leaf_split_and_insert(cursor, key, row);
        }

        let page = self.pager.page_mut(cursor.page_num)?;
        LeafNodeMut::from_page(page)?.insert_cell(cursor.cell_num as usize, key, row)
    }

    /// Splits a full leaf around a pending insertion: the old node keeps the
    /// lower half of the merged cell sequence, a fresh right sibling takes
    /// the upper half, and the parent learns about both.
    fn leaf_split_and_insert(&mut self, cursor: &Cursor, key: u32, row: &Row) -> Result<()> {
        let old_page_num = cursor.page_num;
        let old_max = self.max_key(old_page_num)?;

        let (old_parent, old_next, old_is_root, mut cells) = {
            let leaf = LeafNode::from_page(self.pager.page(old_page_num)?)?;
            let num_cells = leaf.num_cells() as usize;
            let mut cells: Vec<Vec<u8>> = Vec::with_capacity(num_cells + 1);
            for i in 0..num_cells {
                cells.push(leaf.cell_at(i)?.to_vec());
            }
            (leaf.parent(), leaf.next_leaf(), leaf.is_root(), cells)
        };

        let mut new_cell = vec![0u8; LEAF_NODE_CELL_SIZE];
        new_cell[..LEAF_NODE_KEY_SIZE].copy_from_slice(&key.to_le_bytes());
        row.serialize(&mut new_cell[LEAF_NODE_KEY_SIZE..])?;
        cells.insert(cursor.cell_num as usize, new_cell);

        ensure!(
            cells.len() == LEAF_NODE_MAX_CELLS + 1,
            "splitting a leaf that was not full"
        );

        let new_page_num = self.pager.unused_page_num();
        {
            let page = self.pager.page_mut(new_page_num)?;
            let mut new_leaf = LeafNodeMut::init(page)?;
            new_leaf.set_parent(old_parent);
            new_leaf.set_next_leaf(old_next);
            for (i, cell) in cells[LEAF_NODE_LEFT_SPLIT_COUNT..].iter().enumerate() {
                new_leaf.write_cell_raw(i, cell)?;
            }
            new_leaf.set_num_cells(LEAF_NODE_RIGHT_SPLIT_COUNT as u32);
        }
        {
            let page = self.pager.page_mut(old_page_num)?;
            let mut old_leaf = LeafNodeMut::from_page(page)?;
            for (i, cell) in cells[..LEAF_NODE_LEFT_SPLIT_COUNT].iter().enumerate() {
                old_leaf.write_cell_raw(i, cell)?;
            }
            old_leaf.set_num_cells(LEAF_NODE_LEFT_SPLIT_COUNT as u32);
            old_leaf.set_next_leaf(new_page_num);
        }

        if old_is_root {
            self.create_new_root(new_page_num)
        } else {
            let new_max = self.max_key(old_page_num)?;
            self.update_internal_node_key(old_parent, old_max, new_max)?;
            self.internal_node_insert(old_parent, new_page_num)
        }
    }

    /// Splits the root. Its contents move to a freshly allocated left child
    /// (the caller supplies the right child) and page 0 is rewritten as an
    /// internal node over the two.
    fn create_new_root(&mut self, right_child_page_num: u32) -> Result<()> {
        let root_page_num = self.root_page_num;
        let root_was_internal = self.node_type(root_page_num)? == NodeType::Internal;

        // Materialize the right child before allocating the left so the two
        // page numbers cannot collide.
        self.pager.page_mut(right_child_page_num)?;
        let left_child_page_num = self.pager.unused_page_num();

        if root_was_internal {
            // The internal split path hands us a still-blank right child.
            let page = self.pager.page_mut(right_child_page_num)?;
            InteriorNodeMut::init(page)?;
        }

        let root_bytes: PageBuf = *self.pager.page(root_page_num)?;
        {
            let page = self.pager.page_mut(left_child_page_num)?;
            page.copy_from_slice(&root_bytes);
            match NodeType::of_page(page)? {
                NodeType::Leaf => LeafNodeMut::from_page(page)?.set_is_root(false),
                NodeType::Internal => InteriorNodeMut::from_page(page)?.set_is_root(false),
            }
        }

        if root_was_internal {
            // Reparent the copied node's children before page 0 is reused,
            // or their parent pointers would still name the root.
            let num_keys = {
                let node = InteriorNode::from_page(self.pager.page(left_child_page_num)?)?;
                node.num_keys() as usize
            };
            for i in 0..=num_keys {
                let child = {
                    let node = InteriorNode::from_page(self.pager.page(left_child_page_num)?)?;
                    node.child_at(i)?
                };
                self.set_node_parent(child, left_child_page_num)?;
            }
        }

        let left_max = self.max_key(left_child_page_num)?;
        {
            let page = self.pager.page_mut(root_page_num)?;
            let mut root = InteriorNodeMut::init(page)?;
            root.set_is_root(true);
            root.set_num_keys(1);
            root.set_cell(0, left_child_page_num, left_max)?;
            root.set_right_child(right_child_page_num);
        }
        self.set_node_parent(left_child_page_num, root_page_num)?;
        self.set_node_parent(right_child_page_num, root_page_num)?;

        Ok(())
    }

    /// Registers `child_page_num` in the internal node `parent_page_num`,
    /// splitting the parent when it is already at capacity.
    fn internal_node_insert(&mut self, parent_page_num: u32, child_page_num: u32) -> Result<()> {
        let child_max = self.max_key(child_page_num)?;

        let (index, original_num_keys, right_child_page_num) = {
            let node = InteriorNode::from_page(self.pager.page(parent_page_num)?)?;
            (
                node.find_child(child_max)?,
                node.num_keys() as usize,
                node.right_child(),
            )
        };

        if original_num_keys >= INTERNAL_NODE_MAX_KEYS {
            return self.internal_node_split_and_insert(parent_page_num, child_page_num);
        }

        if right_child_page_num == INVALID_PAGE_NUM {
            // Empty node: the first child slots straight into right_child.
            let page = self.pager.page_mut(parent_page_num)?;
            InteriorNodeMut::from_page(page)?.set_right_child(child_page_num);
            return Ok(());
        }

        let right_max = self.max_key(right_child_page_num)?;

        let page = self.pager.page_mut(parent_page_num)?;
        let mut node = InteriorNodeMut::from_page(page)?;
        // Growing first is sound: both branches below fully overwrite the
        // cell at original_num_keys.
        node.set_num_keys(original_num_keys as u32 + 1);

        if child_max > right_max {
            // The new child outranks the right child: demote the old right
            // child into the last cell, keyed by its own max.
            node.set_cell(original_num_keys, right_child_page_num, right_max)?;
            node.set_right_child(child_page_num);
        } else {
            for i in ((index + 1)..=original_num_keys).rev() {
                node.copy_cell(i - 1, i)?;
            }
            node.set_cell(index, child_page_num, child_max)?;
        }

        Ok(())
    }

    /// Splits a full internal node while inserting `child_page_num`. The
    /// upper half of the children migrates to a new sibling; when the node
    /// was the root, `create_new_root` runs first and the sibling becomes the
    /// new root's right child.
    fn internal_node_split_and_insert(
        &mut self,
        parent_page_num: u32,
        child_page_num: u32,
    ) -> Result<()> {
        let mut old_page_num = parent_page_num;
        let old_max = self.max_key(old_page_num)?;
        let child_max = self.max_key(child_page_num)?;
        let new_page_num = self.pager.unused_page_num();

        let splitting_root =
            InteriorNode::from_page(self.pager.page(old_page_num)?)?.is_root();

        let parent_of_old = if splitting_root {
            self.create_new_root(new_page_num)?;
            // The node being split now lives at the new root's first child.
            old_page_num = {
                let root = InteriorNode::from_page(self.pager.page(self.root_page_num)?)?;
                root.child_at(0)?
            };
            self.root_page_num
        } else {
            let parent = InteriorNode::from_page(self.pager.page(old_page_num)?)?.parent();
            let page = self.pager.page_mut(new_page_num)?;
            InteriorNodeMut::init(page)?;
            parent
        };

        // The old right child moves over first; the old node temporarily has
        // no right child at all.
        let moved_right = {
            let node = InteriorNode::from_page(self.pager.page(old_page_num)?)?;
            node.right_child()
        };
        self.internal_node_insert(new_page_num, moved_right)?;
        self.set_node_parent(moved_right, new_page_num)?;
        {
            let page = self.pager.page_mut(old_page_num)?;
            InteriorNodeMut::from_page(page)?.set_right_child(INVALID_PAGE_NUM);
        }

        // Migrate children above the middle key.
        let mut i = INTERNAL_NODE_MAX_KEYS - 1;
        while i > INTERNAL_NODE_MAX_KEYS / 2 {
            let moved = {
                let node = InteriorNode::from_page(self.pager.page(old_page_num)?)?;
                node.child_at(i)?
            };
            self.internal_node_insert(new_page_num, moved)?;
            self.set_node_parent(moved, new_page_num)?;
            {
                let page = self.pager.page_mut(old_page_num)?;
                let mut node = InteriorNodeMut::from_page(page)?;
                let num_keys = node.num_keys();
                node.set_num_keys(num_keys - 1);
            }
            i -= 1;
        }

        // Promote the highest remaining child to be the old node's right
        // child.
        {
            let (promoted, num_keys) = {
                let node = InteriorNode::from_page(self.pager.page(old_page_num)?)?;
                let num_keys = node.num_keys() as usize;
                (node.child_at(num_keys - 1)?, num_keys)
            };
            let page = self.pager.page_mut(old_page_num)?;
            let mut node = InteriorNodeMut::from_page(page)?;
            node.set_right_child(promoted);
            node.set_num_keys(num_keys as u32 - 1);
        }

        // The pending child lands in whichever half now covers its keys.
        let max_after_split = self.max_key(old_page_num)?;
        let destination_page_num = if child_max < max_after_split {
            old_page_num
        } else {
            new_page_num
        };
        self.internal_node_insert(destination_page_num, child_page_num)?;
        self.set_node_parent(child_page_num, destination_page_num)?;

        let old_max_after = self.max_key(old_page_num)?;
        self.update_internal_node_key(parent_of_old, old_max, old_max_after)?;

        if !splitting_root {
            let grandparent = self.node_parent(old_page_num)?;
            self.internal_node_insert(grandparent, new_page_num)?;
            self.set_node_parent(new_page_num, grandparent)?;
        }

        Ok(())
    }

    /// Rewrites the separator that used to read `old_key`. When `old_key`
    /// was reachable only through `right_child` there is no separator slot
    /// for it and nothing needs fixing.
    fn update_internal_node_key(
        &mut self,
        page_num: u32,
        old_key: u32,
        new_key: u32,
    ) -> Result<()> {
        let (index, num_keys) = {
            let node = InteriorNode::from_page(self.pager.page(page_num)?)?;
            (node.find_child(old_key)?, node.num_keys() as usize)
        };

        if index < num_keys {
            let page = self.pager.page_mut(page_num)?;
            InteriorNodeMut::from_page(page)?.set_key(index, new_key)?;
        }

        Ok(())
    }

    /// Renders the tree as an indented listing, one node per `- leaf` /
    /// `- internal` line, keys beneath.
    pub fn render(&mut self) -> Result<String> {
        let mut out = String::new();
        self.render_node(&mut out, self.root_page_num, 0)?;
        Ok(out)
    }

    fn render_node(&mut self, out: &mut String, page_num: u32, depth: usize) -> Result<()> {
        use std::fmt::Write as _;

        match self.node_type(page_num)? {
            NodeType::Leaf => {
                let keys = {
                    let leaf = LeafNode::from_page(self.pager.page(page_num)?)?;
                    (0..leaf.num_cells() as usize)
                        .map(|i| leaf.key_at(i))
                        .collect::<Result<Vec<u32>>>()?
                };
                writeln!(out, "{}- leaf (size {})", "  ".repeat(depth), keys.len())?;
                for key in keys {
                    writeln!(out, "{}- {}", "  ".repeat(depth + 1), key)?;
                }
            }
            NodeType::Internal => {
                let (children, keys) = {
                    let node = InteriorNode::from_page(self.pager.page(page_num)?)?;
                    let num_keys = node.num_keys() as usize;
                    let mut children = Vec::with_capacity(num_keys + 1);
                    let mut keys = Vec::with_capacity(num_keys);
                    for i in 0..num_keys {
                        children.push(node.child_at(i)?);
                        keys.push(node.key_at(i)?);
                    }
                    if num_keys > 0 {
                        children.push(node.child_at(num_keys)?);
                    }
                    (children, keys)
                };
                writeln!(out, "{}- internal (size {})", "  ".repeat(depth), keys.len())?;
                for (i, key) in keys.iter().enumerate() {
                    self.render_node(out, children[i], depth + 1)?;
                    writeln!(out, "{}- key {}", "  ".repeat(depth + 1), key)?;
                }
                if let Some(&right) = children.last().filter(|_| !keys.is_empty()) {
                    self.render_node(out, right, depth + 1)?;
                }
            }
        }

        Ok(())
    }

    /// Walks the whole tree and verifies its structural invariants: node
    /// typing, parent pointers, separator keys matching child maxima, sorted
    /// cells, bounded fanout, and a leaf chain that visits every leaf once in
    /// key order. Cheap enough to run after every mutation in tests.
    pub fn check_integrity(&mut self) -> Result<()> {
        let mut leaves = Vec::new();
        let root = self.root_page_num;
        self.check_node(root, None, &mut leaves)?;

        // The leaf chain must mirror the in-order traversal exactly.
        for (i, &(page_num, _)) in leaves.iter().enumerate() {
            let next = LeafNode::from_page(self.pager.page(page_num)?)?.next_leaf();
            match leaves.get(i + 1) {
                Some(&(expected, _)) => ensure!(
                    next == expected,
                    "leaf {} chains to {} but traversal order says {}",
                    page_num,
                    next,
                    expected
                ),
                None => ensure!(
                    next == 0,
                    "rightmost leaf {} chains to {} instead of ending",
                    page_num,
                    next
                ),
            }
        }

        let mut previous: Option<u32> = None;
        for &(page_num, ref keys) in &leaves {
            for &key in keys {
                if let Some(prev) = previous {
                    ensure!(
                        key > prev,
                        "keys out of order across the leaf chain at page {} ({} after {})",
                        page_num,
                        key,
                        prev
                    );
                }
                previous = Some(key);
            }
        }

        Ok(())
    }

    fn check_node(
        &mut self,
        page_num: u32,
        expected_parent: Option<u32>,
        leaves: &mut Vec<(u32, Vec<u32>)>,
    ) -> Result<Option<u32>> {
        match self.node_type(page_num)? {
            NodeType::Leaf => {
                let (is_root, parent, keys) = {
                    let leaf = LeafNode::from_page(self.pager.page(page_num)?)?;
                    let keys = (0..leaf.num_cells() as usize)
                        .map(|i| leaf.key_at(i))
                        .collect::<Result<Vec<u32>>>()?;
                    (leaf.is_root(), leaf.parent(), keys)
                };

                ensure!(
                    is_root == expected_parent.is_none(),
                    "leaf {} has wrong root flag",
                    page_num
                );
                if let Some(expected) = expected_parent {
                    ensure!(
                        parent == expected,
                        "leaf {} records parent {} but is a child of {}",
                        page_num,
                        parent,
                        expected
                    );
                }
                ensure!(
                    keys.len() <= LEAF_NODE_MAX_CELLS,
                    "leaf {} overflows its cell capacity",
                    page_num
                );
                ensure!(
                    keys.windows(2).all(|w| w[0] < w[1]),
                    "leaf {} cells are not strictly ascending",
                    page_num
                );
                ensure!(
                    expected_parent.is_none() || !keys.is_empty(),
                    "non-root leaf {} is empty",
                    page_num
                );

                let max = keys.last().copied();
                leaves.push((page_num, keys));
                Ok(max)
            }
            NodeType::Internal => {
                let (is_root, parent, num_keys, children, keys) = {
                    let node = InteriorNode::from_page(self.pager.page(page_num)?)?;
                    let num_keys = node.num_keys() as usize;
                    let mut children = Vec::with_capacity(num_keys + 1);
                    let mut keys = Vec::with_capacity(num_keys);
                    for i in 0..num_keys {
                        children.push(node.child_at(i)?);
                        keys.push(node.key_at(i)?);
                    }
                    children.push(node.child_at(num_keys)?);
                    (node.is_root(), node.parent(), num_keys, children, keys)
                };

                ensure!(
                    is_root == expected_parent.is_none(),
                    "internal node {} has wrong root flag",
                    page_num
                );
                if let Some(expected) = expected_parent {
                    ensure!(
                        parent == expected,
                        "internal node {} records parent {} but is a child of {}",
                        page_num,
                        parent,
                        expected
                    );
                }
                ensure!(
                    num_keys <= INTERNAL_NODE_MAX_KEYS,
                    "internal node {} overflows its key capacity",
                    page_num
                );
                ensure!(
                    num_keys > 0,
                    "internal node {} has no keys",
                    page_num
                );

                let mut last_max: Option<u32> = None;
                for i in 0..num_keys {
                    let child_max = self
                        .check_node(children[i], Some(page_num), leaves)?
                        .ok_or_else(|| eyre::eyre!("empty subtree under internal node {}", page_num))?;
                    ensure!(
                        child_max == keys[i],
                        "internal node {} key {} is {} but child max is {}",
                        page_num,
                        i,
                        keys[i],
                        child_max
                    );
                    if let Some(prev) = last_max {
                        ensure!(
                            keys[i] > prev,
                            "internal node {} keys are not ascending",
                            page_num
                        );
                    }
                    last_max = Some(child_max);
                }

                let right_max = self
                    .check_node(children[num_keys], Some(page_num), leaves)?
                    .ok_or_else(|| eyre::eyre!("empty right subtree under internal node {}", page_num))?;
                if let Some(prev) = last_max {
                    ensure!(
                        right_max > prev,
                        "internal node {} right subtree does not outrank its keys",
                        page_num
                    );
                }

                Ok(Some(right_max))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn open_tree() -> (Pager, TempDir) {
        let dir = tempdir().unwrap();
        let mut pager = Pager::open(dir.path().join("test.db")).unwrap();

        let page = pager.page_mut(0).unwrap();
        let mut root = LeafNodeMut::init(page).unwrap();
        root.set_is_root(true);

        (pager, dir)
    }

    fn row(key: u32) -> Row {
        Row::new(key, format!("user{}", key), format!("u{}@x", key))
    }

    fn insert_all(tree: &mut BTree<'_>, keys: impl IntoIterator<Item = u32>) {
        for key in keys {
            assert_eq!(tree.insert(&row(key)).unwrap(), InsertOutcome::Inserted);
            tree.check_integrity().unwrap();
        }
    }

    fn collect_keys(tree: &mut BTree<'_>) -> Vec<u32> {
        let mut cursor = tree.start().unwrap();
        let mut keys = Vec::new();
        while !cursor.end_of_table {
            keys.push(cursor.row(tree).unwrap().id);
            cursor.advance(tree).unwrap();
        }
        keys
    }

    #[test]
    fn single_leaf_stays_sorted() {
        let (mut pager, _dir) = open_tree();
        let mut tree = BTree::new(&mut pager, 0);

        insert_all(&mut tree, [3, 1, 2]);

        assert_eq!(collect_keys(&mut tree), vec![1, 2, 3]);
    }

    #[test]
    fn duplicate_key_is_rejected_without_mutation() {
        let (mut pager, _dir) = open_tree();
        let mut tree = BTree::new(&mut pager, 0);

        insert_all(&mut tree, [1, 2]);
        let before = tree.render().unwrap();

        assert_eq!(
            tree.insert(&row(1)).unwrap(),
            InsertOutcome::DuplicateKey
        );

        assert_eq!(tree.render().unwrap(), before);
        assert_eq!(collect_keys(&mut tree), vec![1, 2]);
    }

    #[test]
    fn start_on_empty_tree_is_end_of_table() {
        let (mut pager, _dir) = open_tree();
        let mut tree = BTree::new(&mut pager, 0);

        let cursor = tree.start().unwrap();

        assert!(cursor.end_of_table);
    }

    #[test]
    fn find_positions_past_last_key() {
        let (mut pager, _dir) = open_tree();
        let mut tree = BTree::new(&mut pager, 0);

        insert_all(&mut tree, [10, 20]);
        let cursor = tree.find(99).unwrap();

        assert_eq!(cursor.cell_num, 2);
        assert!(!cursor.end_of_table);
    }

    #[test]
    fn leaf_split_creates_internal_root() {
        let (mut pager, _dir) = open_tree();
        let mut tree = BTree::new(&mut pager, 0);

        insert_all(&mut tree, 1..=LEAF_NODE_MAX_CELLS as u32 + 1);

        assert_eq!(tree.max_key(0).unwrap(), 14);
        assert_eq!(
            collect_keys(&mut tree),
            (1..=14).collect::<Vec<u32>>()
        );

        // format test: the canonical two-leaf shape after 14 ascending inserts
        let expected = "\
- internal (size 1)
  - leaf (size 7)
    - 1
    - 2
    - 3
    - 4
    - 5
    - 6
    - 7
  - key 7
  - leaf (size 7)
    - 8
    - 9
    - 10
    - 11
    - 12
    - 13
    - 14
";
        assert_eq!(tree.render().unwrap(), expected);
    }

    #[test]
    fn render_format_single_leaf() {
        let (mut pager, _dir) = open_tree();
        let mut tree = BTree::new(&mut pager, 0);

        insert_all(&mut tree, [3, 1, 2]);

        assert_eq!(
            tree.render().unwrap(),
            "- leaf (size 3)\n  - 1\n  - 2\n  - 3\n"
        );
    }

    #[test]
    fn ascending_inserts_exercise_internal_splits() {
        let (mut pager, _dir) = open_tree();
        let mut tree = BTree::new(&mut pager, 0);

        insert_all(&mut tree, 1..=100);

        assert_eq!(collect_keys(&mut tree), (1..=100).collect::<Vec<u32>>());
    }

    #[test]
    fn descending_inserts_exercise_left_heavy_splits() {
        let (mut pager, _dir) = open_tree();
        let mut tree = BTree::new(&mut pager, 0);

        insert_all(&mut tree, (1..=100).rev());

        assert_eq!(collect_keys(&mut tree), (1..=100).collect::<Vec<u32>>());
    }

    #[test]
    fn interleaved_inserts_keep_invariants() {
        let (mut pager, _dir) = open_tree();
        let mut tree = BTree::new(&mut pager, 0);

        // deterministic shuffle: i * 67 mod 121 permutes 1..=120 because 67
        // and 121 are coprime, so both split directions get exercised
        let keys = (1..=120u32).map(|i| (i * 67) % 121);
        insert_all(&mut tree, keys);

        assert_eq!(collect_keys(&mut tree), (1..=120).collect::<Vec<u32>>());
    }

    #[test]
    fn duplicate_after_splits_is_rejected() {
        let (mut pager, _dir) = open_tree();
        let mut tree = BTree::new(&mut pager, 0);

        insert_all(&mut tree, 1..=30);

        for key in [1u32, 15, 30] {
            assert_eq!(
                tree.insert(&row(key)).unwrap(),
                InsertOutcome::DuplicateKey
            );
        }
        tree.check_integrity().unwrap();
        assert_eq!(collect_keys(&mut tree), (1..=30).collect::<Vec<u32>>());
    }

    #[test]
    fn rows_survive_the_splits() {
        let (mut pager, _dir) = open_tree();
        let mut tree = BTree::new(&mut pager, 0);

        insert_all(&mut tree, 1..=40);

        let cursor = tree.find(37).unwrap();
        let found = cursor.row(&mut tree).unwrap();

        assert_eq!(found.id, 37);
        assert_eq!(found.username, "user37");
        assert_eq!(found.email, "u37@x");
    }
}
