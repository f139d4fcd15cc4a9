//! # Database Handle
//!
//! One table bound to one file. Opening bootstraps an empty root leaf on a
//! brand-new file; closing flushes every resident page and syncs. The handle
//! owns the pager and lends it to a [`BTree`] per operation.

mod executor;

pub use executor::ExecuteResult;

use std::path::Path;

use eyre::Result;

use crate::btree::{BTree, LeafNodeMut};
use crate::storage::Pager;

#[derive(Debug)]
pub struct Database {
    pager: Pager,
    root_page_num: u32,
}

impl Database {
    /// Opens (or creates) a database file. A new file gets page 0 stamped as
    /// the root leaf before anything else touches it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut pager = Pager::open(path)?;

        if pager.num_pages() == 0 {
            let page = pager.page_mut(0)?;
            let mut root = LeafNodeMut::init(page)?;
            root.set_is_root(true);
        }

        Ok(Self {
            pager,
            root_page_num: 0,
        })
    }

    /// Borrows the pager as a tree for one operation.
    pub fn tree(&mut self) -> BTree<'_> {
        BTree::new(&mut self.pager, self.root_page_num)
    }

    /// The `.btree` listing.
    pub fn render_tree(&mut self) -> Result<String> {
        self.tree().render()
    }

    /// Flushes every resident page and syncs the file. The handle stays
    /// usable; pages fault back in on demand.
    pub fn close(&mut self) -> Result<()> {
        self.pager.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_bootstraps_root_leaf() {
        let dir = tempdir().unwrap();
        let mut db = Database::open(dir.path().join("test.db")).unwrap();

        let mut tree = db.tree();
        let cursor = tree.start().unwrap();

        assert!(cursor.end_of_table);
        tree.check_integrity().unwrap();
    }

    #[test]
    fn close_writes_a_whole_number_of_pages() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let mut db = Database::open(&path).unwrap();
        db.tree()
            .insert(&crate::record::Row::new(1, "a", "a@x"))
            .unwrap();
        db.close().unwrap();

        let len = std::fs::metadata(&path).unwrap().len();
        assert_eq!(len % crate::config::PAGE_SIZE as u64, 0);
        assert!(len > 0);
    }

    #[test]
    fn reopen_rejects_truncated_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let mut db = Database::open(&path).unwrap();
            db.tree()
                .insert(&crate::record::Row::new(1, "a", "a@x"))
                .unwrap();
            db.close().unwrap();
        }

        let data = std::fs::read(&path).unwrap();
        std::fs::write(&path, &data[..data.len() - 1]).unwrap();

        assert!(Database::open(&path).is_err());
    }
}
