//! `rbtree-harness`: a line-oriented command driver over the `rbtree` ordered
//! container, usable as a differential-testing oracle against a reference
//! implementation.

mod args;
mod commands;
mod error;
mod record;
mod repl;

use std::env;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, IsTerminal, Write};
use std::process::ExitCode;

use args::Task;
use error::HarnessError;

fn main() -> ExitCode {
    env_logger::Builder::new()
        .parse_filters(&env::var("RBTREE_LOG").unwrap_or_else(|_| "info".to_owned()))
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("rbtree-harness: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), HarnessError> {
    match args::parse()? {
        Task::Help => {
            eprintln!("{}", args::USAGE);
            Ok(())
        }
        Task::Run { input, output } => {
            let interactive = input.is_none() && io::stdin().is_terminal();
            match (input, output) {
                (Some(in_path), Some(out_path)) => {
                    let mut r = BufReader::new(File::open(in_path)?);
                    let mut w = BufWriter::new(File::create(out_path)?);
                    repl::run(&mut r, &mut w, interactive)?;
                    w.flush()?;
                }
                (Some(in_path), None) => {
                    let mut r = BufReader::new(File::open(in_path)?);
                    let mut w = io::stdout();
                    repl::run(&mut r, &mut w, interactive)?;
                    w.flush()?;
                }
                (None, Some(out_path)) => {
                    let mut r = io::stdin().lock();
                    let mut w = BufWriter::new(File::create(out_path)?);
                    repl::run(&mut r, &mut w, interactive)?;
                    w.flush()?;
                }
                (None, None) => {
                    let mut r = io::stdin().lock();
                    let mut w = io::stdout();
                    repl::run(&mut r, &mut w, interactive)?;
                    w.flush()?;
                }
            }
            Ok(())
        }
    }
}
