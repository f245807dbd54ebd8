//! Failure types the harness binary can produce.
//!
//! Flat, `Display`-implementing enum with a hand-written `From<std::io::Error>`, the
//! same shape `cli/src/error.rs`'s `CliError` takes: no context chaining, no
//! `thiserror`.

use core::fmt;

pub type HarnessResult<T> = Result<T, HarnessError>;

#[derive(Debug)]
pub enum HarnessError {
    ArgsErr(String),
    IoError(std::io::Error),
    /// A line exceeded the harness's maximum accepted length with no newline yet
    /// found; fatal per the input-handling contract.
    OverlongLine,
}

impl From<std::io::Error> for HarnessError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArgsErr(e) => write!(f, "incorrect arguments. {e}"),
            Self::IoError(e) => write!(f, "i/o error. {e}"),
            Self::OverlongLine => write!(f, "input line exceeded the maximum accepted length"),
        }
    }
}

impl std::error::Error for HarnessError {}
