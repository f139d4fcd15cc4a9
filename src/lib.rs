//! # adabase - Single-File B+Tree Storage Engine
//!
//! A disk-backed storage engine persisting fixed-schema rows keyed by a
//! 32-bit id, driven by an interactive shell. One database is one file: a
//! flat array of 4096-byte pages forming a B+tree whose root never leaves
//! page 0.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │        CLI (REPL, meta-commands)     │
//! ├─────────────────────────────────────┤
//! │   Parser        │  Assistant port    │
//! ├─────────────────┴───────────────────┤
//! │       Database (lifecycle, exec)     │
//! ├─────────────────────────────────────┤
//! │   B+Tree (nodes, splits, cursors)    │
//! ├─────────────────────────────────────┤
//! │    Row serialization (fixed slots)   │
//! ├─────────────────────────────────────┤
//! │        Pager (page table, file)      │
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use adabase::database::Database;
//! use adabase::parsing::parse;
//!
//! let mut db = Database::open("./users.db")?;
//! db.execute(&parse("insert alice 1 alice@example.com")?)?;
//! let rows = db.execute(&parse("select")?)?;
//! db.close()?;
//! ```
//!
//! ## Scope
//!
//! Strictly single-threaded and synchronous. Rows are inserted and scanned,
//! never updated or deleted; pages are allocated and never freed. Durability
//! is owed only on clean close, which flushes every resident page.
//!
//! ## Module Overview
//!
//! - [`storage`]: the pager, a page table over the database file
//! - [`btree`]: node layouts, tree algorithms, cursors
//! - [`record`]: fixed-slot row serialization
//! - [`database`]: open/close lifecycle and statement execution
//! - [`parsing`]: the two-statement parser
//! - [`cli`]: REPL, meta-commands, assistant port

#[macro_use]
mod macros;

pub mod btree;
pub mod cli;
pub mod config;
pub mod database;
pub mod parsing;
pub mod record;
pub mod storage;

pub use database::{Database, ExecuteResult};
pub use parsing::{parse, Statement};
pub use record::Row;
