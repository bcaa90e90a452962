//! Output formatters.
//!
//! Formatters are the only consumers of the atom index to line number
//! mapping: a chunk's atom range `a..b` covers the 1-based lines
//! `a + 1..=b` of its side. All formatters write raw line bytes to an
//! [`io::Write`], so non-UTF-8 input passes through unchanged.

use std::io::{self, Write};
use std::ops::Range;

use crate::{Chunk, ChunkKind, DiffResult};

mod context;
mod ed;
mod unified;

pub use context::write_context;
pub use ed::write_ed;
pub use unified::write_unified;

/// Writes the full listing: every line of both sides in chunk order,
/// prefixed with ` `, `-` or `+`.
pub fn write_plain(result: &DiffResult<'_>, mut out: impl Write) -> io::Result<()> {
    for chunk in result.chunks() {
        match chunk.kind() {
            ChunkKind::Equal => {
                for i in chunk.left.clone() {
                    write_line(&mut out, b" ", result.left().atom_bytes(i))?;
                }
            }
            ChunkKind::Removal => {
                for i in chunk.left.clone() {
                    write_line(&mut out, b"-", result.left().atom_bytes(i))?;
                }
            }
            ChunkKind::Addition => {
                for i in chunk.right.clone() {
                    write_line(&mut out, b"+", result.right().atom_bytes(i))?;
                }
            }
            ChunkKind::Unsolved => unreachable!("results only contain solved chunks"),
        }
    }
    Ok(())
}

fn write_line(out: &mut impl Write, prefix: &[u8], line: &[u8]) -> io::Result<()> {
    out.write_all(prefix)?;
    out.write_all(line)?;
    if !matches!(line.last(), Some(b'\n' | b'\r')) {
        out.write_all(b"\n")?;
    }
    Ok(())
}

fn count(range: &Range<u32>) -> u32 {
    range.end - range.start
}

/// Groups the indices of changed chunks into hunks: two changes separated
/// by at most `2 * context` equal lines share a group. The returned
/// ranges are chunk indices and include the equal chunks between the
/// changes of a group.
fn change_groups(chunks: &[Chunk], context: u32) -> Vec<Range<usize>> {
    let mut groups = Vec::new();
    let mut start = None;
    let mut last_change = 0;
    for (i, chunk) in chunks.iter().enumerate() {
        if chunk.is_equal() {
            continue;
        }
        if start.is_some() {
            let gap: u32 = chunks[last_change + 1..i]
                .iter()
                .map(|c| count(&c.left))
                .sum();
            if gap > 2 * context {
                groups.push(start.take().unwrap()..last_change + 1);
            }
        }
        if start.is_none() {
            start = Some(i);
        }
        last_change = i;
    }
    if let Some(start) = start {
        groups.push(start..last_change + 1);
    }
    groups
}

/// Context available before and after one group: bounded by the
/// neighbouring equal chunks (or the ends of the input).
fn group_margins(chunks: &[Chunk], group: &Range<usize>, context: u32) -> (u32, u32) {
    let first = &chunks[group.start];
    let lead = if group.start == 0 {
        first.left.start
    } else {
        count(&chunks[group.start - 1].left)
    };
    let trail = match chunks.get(group.end) {
        Some(next) => count(&next.left),
        None => 0,
    };
    (context.min(lead), context.min(trail))
}

/// True when the chunk is half of a remove/add pair that context-style
/// formats render as a change.
fn is_paired(chunks: &[Chunk], i: usize) -> bool {
    (chunks[i].is_removal() && chunks.get(i + 1).is_some_and(Chunk::is_addition))
        || (chunks[i].is_addition() && i > 0 && chunks[i - 1].is_removal())
}
