use std::io::{self, Write};
use std::ops::Range;

use super::{change_groups, count, group_margins};
use crate::{ChunkKind, DiffResult};

/// Writes the diff in the unified format of `diff -u` / `git diff`,
/// with `context` lines of context around each hunk. File headers are
/// left to the caller.
pub fn write_unified(
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
        let (before_start, before_len) = hunk_pos(&before);
        let (after_start, after_len) = hunk_pos(&after);
        writeln!(
            out,
            "@@ -{before_start},{before_len} +{after_start},{after_len} @@"
        )?;
        for i in before.start..first.left.start {
            line(&mut out, b' ', result, Side::Left, i)?;
        }
        for chunk in &chunks[group.clone()] {
            match chunk.kind() {
                ChunkKind::Equal => {
                    for i in chunk.left.clone() {
                        line(&mut out, b' ', result, Side::Left, i)?;
                    }
                }
                ChunkKind::Removal => {
                    for i in chunk.left.clone() {
                        line(&mut out, b'-', result, Side::Left, i)?;
                    }
                }
                ChunkKind::Addition => {
                    for i in chunk.right.clone() {
                        line(&mut out, b'+', result, Side::Right, i)?;
                    }
                }
                ChunkKind::Unsolved => unreachable!("results only contain solved chunks"),
            }
        }
        for i in last.left.end..before.end {
            line(&mut out, b' ', result, Side::Left, i)?;
        }
    }
    Ok(())
}

/// Line number and count for a hunk header; an empty range names the
/// line before it, per the unified format.
fn hunk_pos(range: &Range<u32>) -> (u32, u32) {
    let len = count(range);
    let start = if len == 0 { range.start } else { range.start + 1 };
    (start, len)
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

fn line(
    out: &mut impl Write,
    marker: u8,
    result: &DiffResult<'_>,
    side: Side,
    idx: u32,
) -> io::Result<()> {
    let bytes = match side {
        Side::Left => result.left().atom_bytes(idx),
        Side::Right => result.right().atom_bytes(idx),
    };
    out.write_all(&[marker])?;
    out.write_all(bytes)?;
    if !matches!(bytes.last(), Some(b'\n' | b'\r')) {
        out.write_all(b"\n\\ No newline at end of file\n")?;
    }
    Ok(())
}
