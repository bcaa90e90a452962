use std::io::{self, Write};
use std::ops::Range;

use super::{change_groups, count, group_margins, is_paired, write_line};
use crate::{Chunk, ChunkKind, DiffResult};

/// Writes the diff in the copied-context format of `diff -c`, with
/// `context` lines of context around each hunk. File headers are left
/// to the caller.
///
/// Lines removed on one side only are marked `-`, lines added on one
/// side only `+`, and remove/add pairs `!` on both sides. A side
/// without changes in a hunk prints its header but no body.
pub fn write_context(
    result: &DiffResult<'_>,
    context: u32,
    mut out: impl Write,
) -> io::Result<()> {
    let chunks = result.chunks();
    for group in change_groups(chunks, context) {
        let (lead, trail) = group_margins(chunks, &group, context);
        let first = &chunks[group.start];
        let last = &chunks[group.end - 1];
        let before = first.left.start - lead..last.left.end + trail;
        let after = first.right.start - lead..last.right.end + trail;

        writeln!(out, "***************")?;
        writeln!(out, "*** {} ****", range_1based(&before))?;
        if chunks[group.clone()].iter().any(|c| c.is_removal()) {
            for i in before.start..first.left.start {
                write_line(&mut out, b"  ", result.left().atom_bytes(i))?;
            }
            for (i, chunk) in chunks.iter().enumerate().take(group.end).skip(group.start) {
                match chunk.kind() {
                    ChunkKind::Equal => {
                        for at in chunk.left.clone() {
                            write_line(&mut out, b"  ", result.left().atom_bytes(at))?;
                        }
                    }
                    ChunkKind::Removal => {
                        let marker: &[u8] = if is_paired(chunks, i) { b"! " } else { b"- " };
                        for at in chunk.left.clone() {
                            write_line(&mut out, marker, result.left().atom_bytes(at))?;
                        }
                    }
                    ChunkKind::Addition => {}
                    ChunkKind::Unsolved => unreachable!("results only contain solved chunks"),
                }
            }
            for i in last.left.end..before.end {
                write_line(&mut out, b"  ", result.left().atom_bytes(i))?;
            }
        }

        writeln!(out, "--- {} ----", range_1based(&after))?;
        if chunks[group.clone()].iter().any(Chunk::is_addition) {
            for i in after.start..first.right.start {
                write_line(&mut out, b"  ", result.right().atom_bytes(i))?;
            }
            for (i, chunk) in chunks.iter().enumerate().take(group.end).skip(group.start) {
                match chunk.kind() {
                    ChunkKind::Equal => {
                        for at in chunk.right.clone() {
                            write_line(&mut out, b"  ", result.right().atom_bytes(at))?;
                        }
                    }
                    ChunkKind::Addition => {
                        let marker: &[u8] = if is_paired(chunks, i) { b"! " } else { b"+ " };
                        for at in chunk.right.clone() {
                            write_line(&mut out, marker, result.right().atom_bytes(at))?;
                        }
                    }
                    ChunkKind::Removal => {}
                    ChunkKind::Unsolved => unreachable!("results only contain solved chunks"),
                }
            }
            for i in last.right.end..after.end {
                write_line(&mut out, b"  ", result.right().atom_bytes(i))?;
            }
        }
    }
    Ok(())
}

/// 1-based inclusive range as the context format prints it: `a,b`, a
/// bare `a` for a single line, or the line before for an empty range.
fn range_1based(range: &Range<u32>) -> String {
    match count(range) {
        0 => format!("{}", range.start),
        1 => format!("{}", range.start + 1),
        _ => format!("{},{}", range.start + 1, range.end),
    }
}
