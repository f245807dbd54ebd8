//! The read-eval-print loop: one line in, one response out, the validator run after
//! every mutation in debug builds.
//!
//! Built on `BufRead::read_line` into a growable `String` rather than the original's
//! fixed `char Line[256]` + `fgets` - Rust strings don't have a fixed capacity to
//! overflow, so the 256-byte "line too long" limit from `original_source` is enforced
//! explicitly instead of falling out of a buffer size, which preserves the observable
//! behavior (an overlong line is fatal) without the C mechanism that produced it.

use std::io::{BufRead, Write};

use rbtree::Tree;

use crate::args::USAGE;
use crate::commands::{self, Command};
use crate::error::{HarnessError, HarnessResult};
use crate::record::{KeyComparator, SystemRecordAllocator};

/// Matches `original_source`'s fixed-size input line buffer; a line that has not
/// terminated by this many bytes aborts the harness.
const MAX_LINE_LEN: usize = 256;

fn is_mutating(cmd: Command) -> bool {
    !matches!(
        cmd,
        Command::Find(_) | Command::ForwardList | Command::BackwardList
    )
}

/// Runs the harness to completion: reads every line of `input`, dispatching
/// commands and writing responses to `output`, then drains the container via
/// repeated root deletion. `interactive` controls whether blank lines/comments are
/// echoed and whether the startup banner is printed.
pub fn run<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    interactive: bool,
) -> HarnessResult<()> {
    if interactive {
        eprintln!("{USAGE}");
    }

    let mut tree = Tree::new(KeyComparator);
    let mut records = SystemRecordAllocator;
    let mut line = String::new();

    loop {
        line.clear();
        let read = read_bounded_line(input, &mut line)?;
        if read == 0 {
            break;
        }

        strip_line_ending(&mut line);

        if line.is_empty() || line.starts_with('#') {
            if !interactive {
                writeln!(output, "{line}")?;
            }
            continue;
        }

        match commands::parse_command(&line) {
            Ok(cmd) => {
                commands::dispatch(&mut tree, &mut records, cmd, output)?;
                if is_mutating(cmd) {
                    tree.validate();
                }
            }
            Err(e) => log::warn!("{e}"),
        }
    }

    commands::teardown(&mut tree, output)?;
    Ok(())
}

/// Reads one line. Returns the number of bytes read (0 at end of input). Errors
/// fatally if the line exceeds [`MAX_LINE_LEN`] bytes, or if it has no terminating
/// `\n` at all - matching `original_source`'s main loop, which treats
/// `Line[Length - 1] != '\n'` as fatal unconditionally. That check fires both when a
/// real fixed `char[256]` buffer truly fills before a newline arrives, and when a
/// short final line at end-of-input is simply missing its trailing newline; `fgets`
/// returns non-NULL leftover content in both cases, so the original can't and
/// doesn't tell them apart. `read_line` reporting a non-empty, non-newline-terminated
/// read is this implementation's equivalent signal for the same condition.
fn read_bounded_line<R: BufRead>(input: &mut R, line: &mut String) -> HarnessResult<usize> {
    let read = input.read_line(line)?;
    if read == 0 {
        return Ok(0);
    }
    if line.len() > MAX_LINE_LEN || !line.ends_with('\n') {
        log::error!("input line exceeded {MAX_LINE_LEN} bytes with no terminating newline");
        return Err(HarnessError::OverlongLine);
    }
    Ok(read)
}

fn strip_line_ending(line: &mut String) {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
}
