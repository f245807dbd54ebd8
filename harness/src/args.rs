//! Process argument parsing: `-i PATH`, `-o PATH`, `-h`, nothing else.
//!
//! Hand-rolled rather than pulled in from a crate like `clap`, matching the closest
//! teacher analog (`cli/src/args.rs`'s `parse() -> CliResult<Task>`): a small `Task`
//! enum built by walking `std::env::args()` once, with an `ArgsErr`-flavored error
//! for anything that doesn't fit the fixed shape.

use crate::error::{HarnessError, HarnessResult};
use std::path::PathBuf;

pub const USAGE: &str = "\
rbtree-harness: a line-oriented command harness over an ordered red-black tree

USAGE:
    rbtree-harness [-i PATH] [-o PATH]
    rbtree-harness -h

OPTIONS:
    -i PATH    read commands from PATH instead of standard input
    -o PATH    write responses to PATH instead of standard output
    -h         print this message and exit

COMMANDS:
    insert   i <int>   allocate a record with the given key and insert it
    find     f <int>   look up a record by key
    delete   d <int>   look up and remove a record by key
    forward-empty   fe   empty the container visiting min -> successor
    backward-empty  be   empty the container visiting max -> predecessor
    forward-list    fl   list every record in ascending order
    backward-list   bl   list every record in descending order

Blank lines and lines starting with `#` are comments.";

#[derive(Debug)]
pub enum Task {
    Help,
    Run {
        input: Option<PathBuf>,
        output: Option<PathBuf>,
    },
}

pub fn parse() -> HarnessResult<Task> {
    let mut input = None;
    let mut output = None;
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" => return Ok(Task::Help),
            "-i" => {
                let path = args
                    .next()
                    .ok_or_else(|| HarnessError::ArgsErr("missing value for `-i`".into()))?;
                input = Some(PathBuf::from(path));
            }
            "-o" => {
                let path = args
                    .next()
                    .ok_or_else(|| HarnessError::ArgsErr("missing value for `-o`".into()))?;
                output = Some(PathBuf::from(path));
            }
            other => {
                return Err(HarnessError::ArgsErr(format!(
                    "unknown option or unexpected positional argument `{other}`"
                )))
            }
        }
    }

    Ok(Task::Run { input, output })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_text_is_non_empty() {
        assert!(!USAGE.is_empty());
    }
}
