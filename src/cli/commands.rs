//! # Meta-Command Handler
//!
//! Lines starting with `.` bypass the statement parser and act on the shell
//! or the engine directly:
//!
//! | Command      | Description                              |
//! |--------------|------------------------------------------|
//! | `.exit`      | Flush, close, and leave the shell        |
//! | `.btree`     | Print the tree rooted at page 0          |
//! | `.constants` | Print the engine layout constants        |
//! | `.help`      | Show available commands                  |

use eyre::Result;

use crate::config::{
    COMMON_NODE_HEADER_SIZE, LEAF_NODE_CELL_SIZE, LEAF_NODE_HEADER_SIZE, LEAF_NODE_MAX_CELLS,
    LEAF_NODE_SPACE_FOR_CELLS, ROW_SIZE,
};
use crate::database::Database;

#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    Exit,
    Output(String),
    Unrecognized,
}

pub fn execute(input: &str, db: &mut Database) -> Result<CommandResult> {
    match input {
        ".exit" => Ok(CommandResult::Exit),
        ".btree" => {
            let tree = db.render_tree()?;
            Ok(CommandResult::Output(format!(
                "Tree:\n{}",
                tree.trim_end_matches('\n')
            )))
        }
        ".constants" => Ok(CommandResult::Output(constants_text())),
        ".help" => Ok(CommandResult::Output(help_text())),
        _ => Ok(CommandResult::Unrecognized),
    }
}

fn constants_text() -> String {
    format!(
        "Constants:\n\
         ROW_SIZE: {}\n\
         COMMON_NODE_HEADER_SIZE: {}\n\
         LEAF_NODE_HEADER_SIZE: {}\n\
         LEAF_NODE_CELL_SIZE: {}\n\
         LEAF_NODE_SPACE_FOR_CELLS: {}\n\
         LEAF_NODE_MAX_CELLS: {}",
        ROW_SIZE,
        COMMON_NODE_HEADER_SIZE,
        LEAF_NODE_HEADER_SIZE,
        LEAF_NODE_CELL_SIZE,
        LEAF_NODE_SPACE_FOR_CELLS,
        LEAF_NODE_MAX_CELLS
    )
}

fn help_text() -> String {
    r#"Commands:

  .exit         Flush everything to disk and leave
  .btree        Print the B-tree
  .constants    Print the engine layout constants
  .help         Show this message

Statements:
  insert <username> <id> <email>
  select"#
        .to_string()
}
