//! # Natural-Language Assistant Port
//!
//! Lines starting with `Ada ` are handed to an out-of-process translator
//! that turns natural language into a statement string, which then re-enters
//! the ordinary parser. The engine only depends on the [`Translator`]
//! contract (some text in, some command text out), never on the assistant
//! process itself; a missing or broken assistant leaves everything but the
//! `Ada ` prefix fully functional.

use std::path::PathBuf;
use std::process::Command;

use eyre::{ensure, Result, WrapErr};

/// Anything that can turn natural language into a statement string.
pub trait Translator {
    fn translate(&self, input: &str) -> Result<String>;
}

/// The stock translator: a Python inference script invoked per request. The
/// first line of its stdout is taken as the command.
pub struct AdaAssistant {
    interpreter: String,
    script: PathBuf,
}

impl AdaAssistant {
    pub fn new(interpreter: impl Into<String>, script: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
        }
    }
}

impl Default for AdaAssistant {
    fn default() -> Self {
        Self::new("python3", "model/lora.py")
    }
}

impl Translator for AdaAssistant {
    fn translate(&self, input: &str) -> Result<String> {
        let output = Command::new(&self.interpreter)
            .arg(&self.script)
            .arg(input)
            .output()
            .wrap_err_with(|| {
                format!(
                    "failed to run translator '{} {}'",
                    self.interpreter,
                    self.script.display()
                )
            })?;

        ensure!(
            output.status.success(),
            "translator exited with {}",
            output.status
        );

        let stdout = String::from_utf8_lossy(&output.stdout);
        let command = stdout.lines().next().unwrap_or("").trim().to_string();

        ensure!(!command.is_empty(), "translator returned no output");

        Ok(command)
    }
}
