//! Command parsing and dispatch: turns one input line into one response line.
//!
//! Response lines are tagged with the command's canonical name regardless of
//! whether the shorthand invoked it - mirroring the original harness, where the
//! dispatch table routes both spellings into the same `Cmd*` function and the
//! function's own name supplies the tag.

use std::io::{self, Write};

use rbtree::{InsertError, Tree};

use crate::record::{KeyComparator, Record, RecordAllocator};

pub const TAG_INSERT: &str = "insert";
pub const TAG_FIND: &str = "find";
pub const TAG_DELETE: &str = "delete";
pub const TAG_FORWARD_EMPTY: &str = "forward-empty";
pub const TAG_BACKWARD_EMPTY: &str = "backward-empty";
pub const TAG_FORWARD_LIST: &str = "forward-list";
pub const TAG_BACKWARD_LIST: &str = "backward-list";
pub const TAG_TEARDOWN: &str = "teardown";

pub type Container = Tree<i64, Record, KeyComparator>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Insert(i64),
    Find(i64),
    Delete(i64),
    ForwardEmpty,
    BackwardEmpty,
    ForwardList,
    BackwardList,
}

/// Parses one already-trimmed, non-blank, non-comment line into a [`Command`].
///
/// Recognizes both canonical and shorthand spellings. Keyed commands require
/// exactly one integer argument; extra tokens, a missing argument, or an argument
/// that doesn't fully parse as a native signed integer are all rejected.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut tokens = line.split_whitespace();
    let keyword = tokens
        .next()
        .ok_or_else(|| "empty command".to_owned())?;

    let keyed = |tokens: &mut std::str::SplitWhitespace<'_>| -> Result<i64, String> {
        let arg = tokens
            .next()
            .ok_or_else(|| format!("`{keyword}` requires an integer argument"))?;
        if tokens.next().is_some() {
            return Err(format!("`{keyword}` takes exactly one argument"));
        }
        arg.parse::<i64>()
            .map_err(|e| format!("invalid integer `{arg}`: {e}"))
    };

    match keyword {
        "insert" | "i" => Ok(Command::Insert(keyed(&mut tokens)?)),
        "find" | "f" => Ok(Command::Find(keyed(&mut tokens)?)),
        "delete" | "d" => Ok(Command::Delete(keyed(&mut tokens)?)),
        "forward-empty" | "fe" => Ok(Command::ForwardEmpty),
        "backward-empty" | "be" => Ok(Command::BackwardEmpty),
        "forward-list" | "fl" => Ok(Command::ForwardList),
        "backward-list" | "bl" => Ok(Command::BackwardList),
        other => Err(format!("unknown command `{other}`")),
    }
}

/// Executes `cmd` against `tree`, writing its response line(s) to `out`. `records`
/// guards the harness's own record allocation, consulted only by `insert`.
pub fn dispatch<W: Write, A: RecordAllocator>(
    tree: &mut Container,
    records: &mut A,
    cmd: Command,
    out: &mut W,
) -> io::Result<()> {
    match cmd {
        Command::Insert(v) => insert(tree, records, v, out),
        Command::Find(v) => find(tree, v, out),
        Command::Delete(v) => delete(tree, v, out),
        Command::ForwardEmpty => forward_empty(tree, out),
        Command::BackwardEmpty => backward_empty(tree, out),
        Command::ForwardList => forward_list(tree, out),
        Command::BackwardList => backward_list(tree, out),
    }
}

fn insert<W: Write, A: RecordAllocator>(
    tree: &mut Container,
    records: &mut A,
    v: i64,
    out: &mut W,
) -> io::Result<()> {
    // mirrors `original_source`'s `CmdInsert`: the harness's own `calloc()` for
    // `USER_STRUCT` is a distinct failure site from `RbTreeInsert()`'s, checked
    // before the tree ever sees the record.
    if records.try_reserve_record().is_err() {
        return writeln!(out, "{TAG_INSERT}: {v}: calloc(): out of memory");
    }

    match tree.insert(Record::new(v)) {
        Ok(_) => writeln!(out, "{TAG_INSERT}: {v}: inserted"),
        Err(InsertError::Exists(id)) => {
            // the colliding node's key always equals `v` under this harness's
            // integer comparator, but the spec calls for reporting it explicitly
            // rather than assuming the caller already knows.
            let existing = tree.user_record(id).key;
            debug_assert_eq!(existing, v);
            writeln!(out, "{TAG_INSERT}: {v}: already exists ({existing})")
        }
        Err(InsertError::OutOfMemory) => {
            writeln!(out, "{TAG_INSERT}: {v}: out of memory")
        }
    }
}

fn find<W: Write>(tree: &Container, v: i64, out: &mut W) -> io::Result<()> {
    match tree.find(&v) {
        Some(_) => writeln!(out, "{TAG_FIND}: {v}: found"),
        None => writeln!(out, "{TAG_FIND}: {v}: not found"),
    }
}

fn delete<W: Write>(tree: &mut Container, v: i64, out: &mut W) -> io::Result<()> {
    match tree.find(&v) {
        Some(id) => {
            tree.delete(id);
            writeln!(out, "{TAG_DELETE}: {v}: removed")
        }
        None => writeln!(out, "{TAG_DELETE}: {v}: not found"),
    }
}

/// Empties `tree` by stepping min -> successor, pre-fetching the next handle before
/// deleting the current one so the walk never reads through a freed node.
fn forward_empty<W: Write>(tree: &mut Container, out: &mut W) -> io::Result<()> {
    let mut cur = tree.min();
    while let Some(id) = cur {
        let next = tree.successor(id);
        let key = tree.user_record(id).key;
        tree.delete(id);
        writeln!(out, "{TAG_FORWARD_EMPTY}: {key}: removed")?;
        cur = next;
    }
    Ok(())
}

/// Mirror of [`forward_empty`]: max -> predecessor.
fn backward_empty<W: Write>(tree: &mut Container, out: &mut W) -> io::Result<()> {
    let mut cur = tree.max();
    while let Some(id) = cur {
        let prev = tree.predecessor(id);
        let key = tree.user_record(id).key;
        tree.delete(id);
        writeln!(out, "{TAG_BACKWARD_EMPTY}: {key}: removed")?;
        cur = prev;
    }
    Ok(())
}

fn forward_list<W: Write>(tree: &Container, out: &mut W) -> io::Result<()> {
    let mut cur = tree.min();
    while let Some(id) = cur {
        writeln!(out, "{TAG_FORWARD_LIST}: {}", tree.user_record(id).key)?;
        cur = tree.successor(id);
    }
    Ok(())
}

fn backward_list<W: Write>(tree: &Container, out: &mut W) -> io::Result<()> {
    let mut cur = tree.max();
    while let Some(id) = cur {
        writeln!(out, "{TAG_BACKWARD_LIST}: {}", tree.user_record(id).key)?;
        cur = tree.predecessor(id);
    }
    Ok(())
}

/// End-of-input cleanup: not `forward_empty` under another name. Repeatedly deletes
/// whatever node is currently at the root, the way `original_source`'s `TearDown`
/// does, and tags its output distinctly so golden-output comparisons can tell
/// implicit end-of-input cleanup apart from an explicit `fe`/`be` command.
pub fn teardown<W: Write>(tree: &mut Container, out: &mut W) -> io::Result<()> {
    while let Some(id) = tree.root_handle() {
        let key = tree.user_record(id).key;
        tree.delete(id);
        tree.validate();
        writeln!(out, "{TAG_TEARDOWN}: {key}: removed via root")?;
    }
    tree.teardown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{BudgetedRecordAllocator, SystemRecordAllocator};

    fn engine() -> Container {
        Tree::new(KeyComparator)
    }

    #[test]
    fn parses_canonical_and_shorthand_identically() {
        assert_eq!(parse_command("insert 5"), Ok(Command::Insert(5)));
        assert_eq!(parse_command("i 5"), Ok(Command::Insert(5)));
        assert_eq!(parse_command("i -5"), Ok(Command::Insert(-5)));
        assert_eq!(parse_command("fe"), Ok(Command::ForwardEmpty));
        assert_eq!(parse_command("forward-empty"), Ok(Command::ForwardEmpty));
    }

    #[test]
    fn rejects_missing_trailing_and_malformed_arguments() {
        assert!(parse_command("insert").is_err());
        assert!(parse_command("insert 5 6").is_err());
        assert!(parse_command("insert abc").is_err());
        assert!(parse_command("insert 99999999999999999999").is_err());
        assert!(parse_command("bogus").is_err());
    }

    #[test]
    fn insert_find_delete_round_trip_lines() {
        let mut tree = engine();
        let mut records = SystemRecordAllocator;
        let mut out = Vec::new();
        insert(&mut tree, &mut records, 5, &mut out).unwrap();
        insert(&mut tree, &mut records, 5, &mut out).unwrap();
        find(&tree, 5, &mut out).unwrap();
        delete(&mut tree, 5, &mut out).unwrap();
        delete(&mut tree, 5, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "insert: 5: inserted");
        assert_eq!(lines[1], "insert: 5: already exists (5)");
        assert_eq!(lines[2], "find: 5: found");
        assert_eq!(lines[3], "delete: 5: removed");
        assert_eq!(lines[4], "delete: 5: not found");
        tree.teardown();
    }

    #[test]
    fn insert_reports_harness_side_record_allocation_failure() {
        let mut tree = engine();
        let mut records = BudgetedRecordAllocator::new(1);
        let mut out = Vec::new();
        insert(&mut tree, &mut records, 1, &mut out).unwrap();
        insert(&mut tree, &mut records, 2, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "insert: 1: inserted");
        assert_eq!(lines[1], "insert: 2: calloc(): out of memory");
        // the rejected record was never reserved in the tree at all
        assert!(tree.find(&2).is_none());
        assert_eq!(tree.len(), 1);
        tree.delete(tree.find(&1).unwrap());
        tree.teardown();
    }

    #[test]
    fn forward_and_backward_empty_visit_in_sorted_order() {
        let mut tree = engine();
        let mut sink = Vec::new();
        for v in [5, 3, 7, 1, 9] {
            tree.insert(Record::new(v)).unwrap();
        }
        forward_empty(&mut tree, &mut sink).unwrap();
        let text = String::from_utf8(sink).unwrap();
        let keys: Vec<i64> = text
            .lines()
            .map(|l| l.split(':').nth(1).unwrap().trim().parse().unwrap())
            .collect();
        assert_eq!(keys, vec![1, 3, 5, 7, 9]);
        assert!(tree.is_empty());
        tree.teardown();

        let mut tree = engine();
        let mut sink = Vec::new();
        for v in [5, 3, 7, 1, 9] {
            tree.insert(Record::new(v)).unwrap();
        }
        backward_empty(&mut tree, &mut sink).unwrap();
        let text = String::from_utf8(sink).unwrap();
        let keys: Vec<i64> = text
            .lines()
            .map(|l| l.split(':').nth(1).unwrap().trim().parse().unwrap())
            .collect();
        assert_eq!(keys, vec![9, 7, 5, 3, 1]);
        assert!(tree.is_empty());
        tree.teardown();
    }

    #[test]
    fn teardown_drains_via_repeated_root_deletion() {
        let mut tree = engine();
        let mut sink = Vec::new();
        for v in 0..20 {
            tree.insert(Record::new(v)).unwrap();
        }
        teardown(&mut tree, &mut sink).unwrap();
        let text = String::from_utf8(sink).unwrap();
        let mut keys: Vec<i64> = text
            .lines()
            .map(|l| l.split(':').nth(1).unwrap().trim().parse().unwrap())
            .collect();
        keys.sort_unstable();
        assert_eq!(keys, (0..20).collect::<Vec<_>>());
    }
}
