//! # adabase CLI Entry Point
//!
//! ```bash
//! # Open (or create) a database file and enter the shell
//! adabase ./mydb.db
//!
//! # Show version / help
//! adabase --version
//! adabase --help
//! ```

use std::env;
use std::path::PathBuf;

use adabase::cli::{AdaAssistant, Repl};
use adabase::database::Database;
use eyre::{bail, Result, WrapErr};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut db_path: Option<PathBuf> = None;
    for arg in &args[1..] {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            "--version" | "-v" => {
                println!("adabase {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            other if other.starts_with('-') => {
                bail!("Unknown option: {}", other);
            }
            path => {
                if db_path.is_some() {
                    bail!("Multiple database paths specified");
                }
                db_path = Some(PathBuf::from(path));
            }
        }
    }

    let Some(db_path) = db_path else {
        bail!("Must supply a database filename.");
    };

    let db = Database::open(&db_path)
        .wrap_err_with(|| format!("failed to open database at '{}'", db_path.display()))?;

    let mut repl = Repl::new(db, Box::new(AdaAssistant::default()))?;
    repl.run()
}

fn print_usage() {
    println!("adabase - single-file B+tree storage engine");
    println!();
    println!("USAGE:");
    println!("    adabase [OPTIONS] <DATABASE_FILE>");
    println!();
    println!("ARGS:");
    println!("    <DATABASE_FILE>    Path to the database file (created if missing)");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help         Print help information");
    println!("    -v, --version      Print version information");
}
