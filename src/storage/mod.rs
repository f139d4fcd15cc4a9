//! # Storage Layer
//!
//! The pager maps page numbers to resident buffers and file offsets. Nothing
//! above this layer touches the file directly.

mod pager;

pub use pager::{PageBuf, Pager};
