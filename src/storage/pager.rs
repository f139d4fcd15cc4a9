//! # Pager
//!
//! Presents the database file as an array of mutable `PAGE_SIZE` buffers
//! indexed by page number. Pages are read from disk the first time they are
//! requested and stay resident until close; there is no eviction, so the
//! resident footprint is bounded by `TABLE_MAX_PAGES * PAGE_SIZE` (~1.6 MiB).
//!
//! ## File Format
//!
//! The file is a plain concatenation of pages:
//!
//! ```text
//! Offset 0:       Page 0 (4096 bytes, always the tree root)
//! Offset 4096:    Page 1
//! Offset 8192:    Page 2
//! ...
//! ```
//!
//! A well-formed file's length is a whole multiple of `PAGE_SIZE`; `open`
//! rejects anything else as corrupt.
//!
//! ## Allocation
//!
//! Pages grow monotonically and are never freed or reused. `unused_page_num`
//! simply hands out the current page count; callers must initialize a fresh
//! page before writing through it.
//!
//! ## Borrow Discipline
//!
//! `page`/`page_mut` borrow `self`, so the compiler ensures no stale buffer
//! reference survives a later call that could (in an evicting implementation)
//! invalidate it.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use eyre::{ensure, Result, WrapErr};

use crate::config::{PAGE_SIZE, TABLE_MAX_PAGES};

pub type PageBuf = [u8; PAGE_SIZE];

#[derive(Debug)]
pub struct Pager {
    file: File,
    file_length: u64,
    num_pages: u32,
    pages: Vec<Option<Box<PageBuf>>>,
}

impl Pager {
    /// Opens or creates the database file and validates its length.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)
            .wrap_err_with(|| format!("failed to open database file '{}'", path.display()))?;

        let file_length = file
            .metadata()
            .wrap_err_with(|| format!("failed to get metadata for '{}'", path.display()))?
            .len();

        ensure!(
            file_length % PAGE_SIZE as u64 == 0,
            "database file '{}' is not a whole number of pages (length {})",
            path.display(),
            file_length
        );

        let mut pages = Vec::with_capacity(TABLE_MAX_PAGES);
        pages.resize_with(TABLE_MAX_PAGES, || None);

        Ok(Self {
            file,
            file_length,
            num_pages: (file_length / PAGE_SIZE as u64) as u32,
            pages,
        })
    }

    /// Number of pages the pager currently knows about (resident or on disk).
    pub fn num_pages(&self) -> u32 {
        self.num_pages
    }

    /// Page number for the next fresh page. Pages are never recycled, so this
    /// is just the current count.
    pub fn unused_page_num(&self) -> u32 {
        self.num_pages
    }

    pub fn page(&mut self, page_num: u32) -> Result<&PageBuf> {
        self.load(page_num)?;
        Ok(self.pages[page_num as usize].as_deref().unwrap())
    }

    pub fn page_mut(&mut self, page_num: u32) -> Result<&mut PageBuf> {
        self.load(page_num)?;
        Ok(self.pages[page_num as usize].as_deref_mut().unwrap())
    }

    /// Faults the page in if it is not resident. Pages beyond the current end
    /// of file come back zeroed; the caller initializes them as a node.
    fn load(&mut self, page_num: u32) -> Result<()> {
        ensure!(
            (page_num as usize) < TABLE_MAX_PAGES,
            "page {} out of bounds (max {})",
            page_num,
            TABLE_MAX_PAGES
        );

        if self.pages[page_num as usize].is_none() {
            let mut buf: Box<PageBuf> = Box::new([0u8; PAGE_SIZE]);

            let pages_on_disk = (self.file_length / PAGE_SIZE as u64) as u32;
            if page_num < pages_on_disk {
                self.file
                    .seek(SeekFrom::Start(page_num as u64 * PAGE_SIZE as u64))
                    .wrap_err_with(|| format!("failed to seek to page {}", page_num))?;
                self.file
                    .read_exact(buf.as_mut_slice())
                    .wrap_err_with(|| format!("failed to read page {}", page_num))?;
            }

            self.pages[page_num as usize] = Some(buf);

            if page_num >= self.num_pages {
                self.num_pages = page_num + 1;
            }
        }

        Ok(())
    }

    /// Writes one resident page back to its slot in the file.
    pub fn flush(&mut self, page_num: u32) -> Result<()> {
        let buf = self.pages[page_num as usize]
            .as_deref()
            .ok_or_else(|| eyre::eyre!("tried to flush non-resident page {}", page_num))?;

        self.file
            .seek(SeekFrom::Start(page_num as u64 * PAGE_SIZE as u64))
            .wrap_err_with(|| format!("failed to seek to page {}", page_num))?;
        self.file
            .write_all(buf)
            .wrap_err_with(|| format!("failed to write page {}", page_num))?;

        Ok(())
    }

    /// Flushes every resident page, syncs the file, and releases the buffers.
    pub fn close(&mut self) -> Result<()> {
        for page_num in 0..self.num_pages {
            if self.pages[page_num as usize].is_some() {
                self.flush(page_num)?;
            }
        }
        self.file
            .sync_all()
            .wrap_err("failed to sync database file")?;
        self.file_length = self.num_pages as u64 * PAGE_SIZE as u64;

        for slot in &mut self.pages {
            *slot = None;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_creates_empty_file() {
        let dir = tempdir().unwrap();
        let pager = Pager::open(dir.path().join("test.db")).unwrap();

        assert_eq!(pager.num_pages(), 0);
        assert_eq!(pager.unused_page_num(), 0);
    }

    #[test]
    fn open_rejects_partial_page() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        std::fs::write(&path, vec![0u8; PAGE_SIZE + 17]).unwrap();

        let result = Pager::open(&path);

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("not a whole number of pages"));
    }

    #[test]
    fn page_out_of_bounds() {
        let dir = tempdir().unwrap();
        let mut pager = Pager::open(dir.path().join("test.db")).unwrap();

        let result = pager.page(TABLE_MAX_PAGES as u32);

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("out of bounds"));
    }

    #[test]
    fn fresh_page_is_zeroed_and_counted() {
        let dir = tempdir().unwrap();
        let mut pager = Pager::open(dir.path().join("test.db")).unwrap();

        let page = pager.page_mut(0).unwrap();
        assert!(page.iter().all(|&b| b == 0));
        assert_eq!(pager.num_pages(), 1);
        assert_eq!(pager.unused_page_num(), 1);
    }

    #[test]
    fn flush_and_reopen_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let mut pager = Pager::open(&path).unwrap();
            let page = pager.page_mut(0).unwrap();
            page[0] = 0xAB;
            page[PAGE_SIZE - 1] = 0xCD;
            pager.close().unwrap();
        }

        let mut pager = Pager::open(&path).unwrap();
        assert_eq!(pager.num_pages(), 1);
        let page = pager.page(0).unwrap();
        assert_eq!(page[0], 0xAB);
        assert_eq!(page[PAGE_SIZE - 1], 0xCD);
    }

    #[test]
    fn close_writes_every_resident_page() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let mut pager = Pager::open(&path).unwrap();
            for i in 0..3u32 {
                pager.page_mut(i).unwrap()[0] = i as u8 + 1;
            }
            pager.close().unwrap();
        }

        let data = std::fs::read(&path).unwrap();
        assert_eq!(data.len(), 3 * PAGE_SIZE);
        assert_eq!(data[0], 1);
        assert_eq!(data[PAGE_SIZE], 2);
        assert_eq!(data[2 * PAGE_SIZE], 3);
    }
}
