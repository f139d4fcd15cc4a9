//! # REPL
//!
//! The interactive shell: read a line, dispatch, print, repeat. Dispatch
//! order is meta-commands (leading `.`), then the `Ada ` assistant prefix
//! (whose translation re-enters the parser as if typed), then the statement
//! parser.
//!
//! User mistakes (unknown commands, parse errors, duplicate keys) print a
//! message and the prompt comes back. Engine failures (I/O, corrupt pages)
//! propagate out of `run` and take the process down with them. Reaching end
//! of input without `.exit` is treated as a read failure, not a clean quit,
//! so piped scripts must end with `.exit` to get a zero exit status.

use eyre::{bail, Result, WrapErr};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::database::{Database, ExecuteResult};
use crate::parsing::{parse, Statement};

use super::assistant::Translator;
use super::commands::{self, CommandResult};

const PROMPT: &str = "db > ";

pub struct Repl {
    db: Database,
    editor: DefaultEditor,
    translator: Box<dyn Translator>,
}

impl Repl {
    pub fn new(db: Database, translator: Box<dyn Translator>) -> Result<Self> {
        let editor = DefaultEditor::new().wrap_err("failed to initialize line editor")?;

        Ok(Self {
            db,
            editor,
            translator,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        self.print_welcome();

        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    if !self.handle_line(&line)? {
                        return Ok(());
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                }
                Err(ReadlineError::Eof) => bail!("Error reading input"),
                Err(err) => return Err(err).wrap_err("Error reading input"),
            }
        }
    }

    /// Returns false when the shell should stop (clean `.exit`). A blank
    /// line is not special: it reaches the parser and reports an
    /// unrecognized keyword, like any other non-statement.
    fn handle_line(&mut self, line: &str) -> Result<bool> {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            let _ = self.editor.add_history_entry(trimmed);
        }

        if trimmed.starts_with('.') {
            return match commands::execute(trimmed, &mut self.db)? {
                CommandResult::Exit => {
                    self.db.close()?;
                    Ok(false)
                }
                CommandResult::Output(text) => {
                    println!("{}", text);
                    Ok(true)
                }
                CommandResult::Unrecognized => {
                    println!("Unrecognized command '{}'", trimmed);
                    Ok(true)
                }
            };
        }

        let statement_line = match trimmed.strip_prefix("Ada ") {
            Some(request) => match self.translator.translate(request) {
                Ok(command) => command,
                Err(err) => {
                    println!("Error: {:#}", err);
                    return Ok(true);
                }
            },
            None => trimmed.to_string(),
        };

        match parse(&statement_line) {
            Ok(statement) => self.dispatch(&statement)?,
            Err(err) => println!("{}", err),
        }

        Ok(true)
    }

    fn dispatch(&mut self, statement: &Statement) -> Result<()> {
        match self.db.execute(statement)? {
            ExecuteResult::Inserted => {}
            ExecuteResult::DuplicateKey => println!("Error: Duplicate key."),
            ExecuteResult::Select { rows } => {
                if rows.is_empty() {
                    println!("DB is empty.");
                } else {
                    for row in rows {
                        println!("({}, {}, {})", row.id, row.username, row.email);
                    }
                }
            }
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!("adabase version {}", env!("CARGO_PKG_VERSION"));
        println!("Enter \".help\" for usage hints.");
    }
}
