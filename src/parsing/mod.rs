//! # Statement Parser
//!
//! The REPL accepts two statements:
//!
//! ```text
//! insert <username> <id> <email>
//! select
//! ```
//!
//! Everything the parser rejects is a recoverable user error carrying the
//! exact message the REPL prints; the engine is never touched before a
//! statement parses and validates.

use std::fmt;

use crate::config::{EMAIL_MAX_LEN, USERNAME_MAX_LEN};
use crate::record::Row;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Insert(Row),
    Select,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrepareError {
    NegativeId,
    StringTooLong,
    SyntaxError,
    Unrecognized(String),
}

impl fmt::Display for PrepareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrepareError::NegativeId => write!(f, "ID must be positive."),
            PrepareError::StringTooLong => write!(f, "String is too long."),
            PrepareError::SyntaxError => {
                write!(f, "Syntax error. Could not parse statement.")
            }
            PrepareError::Unrecognized(line) => {
                write!(f, "Unrecognized keyword at start of '{}'.", line)
            }
        }
    }
}

impl std::error::Error for PrepareError {}

pub fn parse(line: &str) -> Result<Statement, PrepareError> {
    let trimmed = line.trim();
    let mut tokens = trimmed.split_whitespace();

    match tokens.next() {
        Some("insert") => {
            let username = tokens.next().ok_or(PrepareError::SyntaxError)?;
            let id_token = tokens.next().ok_or(PrepareError::SyntaxError)?;
            let email = tokens.next().ok_or(PrepareError::SyntaxError)?;

            let id: i64 = id_token.parse().map_err(|_| PrepareError::SyntaxError)?;
            if id < 0 {
                return Err(PrepareError::NegativeId);
            }
            let id = u32::try_from(id).map_err(|_| PrepareError::SyntaxError)?;

            if username.len() > USERNAME_MAX_LEN || email.len() > EMAIL_MAX_LEN {
                return Err(PrepareError::StringTooLong);
            }

            Ok(Statement::Insert(Row::new(id, username, email)))
        }
        Some("select") if tokens.next().is_none() => Ok(Statement::Select),
        _ => Err(PrepareError::Unrecognized(trimmed.to_string())),
    }
}
