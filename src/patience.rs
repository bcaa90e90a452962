//! Patience diff: LCS over common-unique atoms via patience sorting.
//!
//! Atoms that occur exactly once on both sides anchor the diff. Each
//! anchor swallows the identical lines around it, the surviving anchors
//! are patience-sorted into the longest common subsequence, and the gaps
//! between consecutive anchors are handed back as unsolved chunks for
//! the inner algorithm. Without a single common-unique atom the
//! algorithm asks for its fallback.

use std::ops::Range;

use ahash::RandomState;
use hashbrown::HashMap;

use crate::atoms::Section;
use crate::chunk::Accumulator;
use crate::engine::Outcome;
use crate::Error;

const NONE: u32 = u32::MAX;

/// Occurrence counts of one line content, plus the position of its last
/// right-side occurrence. Grouped counting keeps the tallies exact for
/// contents that occur three or more times.
#[derive(Default)]
struct Occurrences {
    left: u32,
    right: u32,
    right_idx: u32,
}

/// Scratch state of one common-unique pair, local indices. Lives for a
/// single invocation; nested frames build their own.
struct Anchor {
    left: u32,
    right: u32,
    /// Identical lines swallowed around the anchor, half-open.
    left_lines: Range<u32>,
    right_lines: Range<u32>,
    /// Patience-sort back-pointer: the anchor on top of the previous
    /// stack when this one was placed.
    prev: u32,
    /// Demoted by being absorbed into an earlier anchor's extension.
    dead: bool,
}

pub(crate) fn diff(
    left: Section<'_, '_>,
    right: Section<'_, '_>,
    acc: &mut Accumulator<'_>,
) -> Result<Outcome, Error> {
    let n = left.len();
    let m = right.len();

    let mut table: HashMap<&[u8], Occurrences, RandomState> =
        HashMap::with_capacity_and_hasher(n as usize, RandomState::new());
    for i in 0..n {
        table.entry(left.bytes(i)).or_default().left += 1;
    }
    for j in 0..m {
        // contents missing on the left can never become anchors
        if let Some(entry) = table.get_mut(right.bytes(j)) {
            entry.right += 1;
            entry.right_idx = j;
        }
    }

    let mut anchors: Vec<Anchor> = Vec::new();
    for i in 0..n {
        if let Some(entry) = table.get(left.bytes(i)) {
            if entry.left == 1 && entry.right == 1 {
                anchors.push(Anchor {
                    left: i,
                    right: entry.right_idx,
                    left_lines: i..i + 1,
                    right_lines: entry.right_idx..entry.right_idx + 1,
                    prev: NONE,
                    dead: false,
                });
            }
        }
    }
    if anchors.is_empty() {
        return Ok(Outcome::Fallback);
    }

    // Swallow identical neighbours around each anchor, in left order.
    // The left floor is the previous surviving anchor's downward reach,
    // the right floor the furthest right reach seen so far; together
    // they keep extensions disjoint even for crossing anchors.
    let mut left_floor = 0;
    let mut right_floor = 0;
    let mut next = 0;
    for i in 0..anchors.len() {
        if anchors[i].dead {
            continue;
        }
        let (al, ar) = (anchors[i].left, anchors[i].right);
        let mut lu = al;
        let mut ru = ar;
        while lu > left_floor && ru > right_floor && left.atoms_eq(lu - 1, &right, ru - 1) {
            lu -= 1;
            ru -= 1;
        }
        let mut ld = al + 1;
        let mut rd = ar + 1;
        next = next.max(i + 1);
        while ld < n && rd < m && left.atoms_eq(ld, &right, rd) {
            while next < anchors.len() && anchors[next].left <= ld {
                if anchors[next].left == ld {
                    anchors[next].dead = true;
                }
                next += 1;
            }
            ld += 1;
            rd += 1;
        }
        anchors[i].left_lines = lu..ld;
        anchors[i].right_lines = ru..rd;
        left_floor = ld;
        right_floor = right_floor.max(rd);
    }

    // LCS by patience sort over the surviving anchors. `stacks` holds
    // the anchor currently on top of each stack, ordered by its right
    // position.
    let mut stacks: Vec<u32> = Vec::new();
    for i in 0..anchors.len() {
        if anchors[i].dead {
            continue;
        }
        let pos = anchors[i].right;
        let stack = stacks.partition_point(|&top| anchors[top as usize].right < pos);
        anchors[i].prev = if stack > 0 { stacks[stack - 1] } else { NONE };
        if stack == stacks.len() {
            stacks.push(i as u32);
        } else {
            stacks[stack] = i as u32;
        }
    }
    let mut chain = Vec::with_capacity(stacks.len());
    let mut cursor = *stacks.last().expect("at least one anchor survives");
    while cursor != NONE {
        chain.push(cursor);
        cursor = anchors[cursor as usize].prev;
    }
    chain.reverse();

    // Emit: the gap before each anchor, the anchor's identical range,
    // and the trailing gap after the last one.
    let mut at_left = 0;
    let mut at_right = 0;
    for &i in &chain {
        let anchor = &anchors[i as usize];
        emit_gap(
            left,
            right,
            acc,
            at_left..anchor.left_lines.start,
            at_right..anchor.right_lines.start,
        );
        acc.add(
            true,
            left.global_range(anchor.left_lines.clone()),
            right.global_range(anchor.right_lines.clone()),
        );
        at_left = anchor.left_lines.end;
        at_right = anchor.right_lines.end;
    }
    emit_gap(left, right, acc, at_left..n, at_right..m);
    Ok(Outcome::Solved)
}

/// A residual gap between anchors: unsolved when both sides are
/// non-empty, otherwise a plain deletion or insertion.
fn emit_gap(
    left: Section<'_, '_>,
    right: Section<'_, '_>,
    acc: &mut Accumulator<'_>,
    l: Range<u32>,
    r: Range<u32>,
) {
    let solved = l.is_empty() || r.is_empty();
    acc.add(solved, left.global_range(l), right.global_range(r));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atomize::{Atomizer, Lines};
    use crate::chunk::{Chunk, ChunkKind};

    fn run(left: &[u8], right: &[u8]) -> Result<Vec<Chunk>, Outcome> {
        let (left, right) = Lines.atomize(left, right);
        let mut result = Vec::new();
        let mut tmp = Vec::new();
        let mut acc = Accumulator::new(&mut result, &mut tmp);
        match diff(left.whole(), right.whole(), &mut acc).unwrap() {
            Outcome::Solved => {
                // emission order is result prefix, then the deferred rest
                result.extend(tmp);
                Ok(result)
            }
            Outcome::Fallback => Err(Outcome::Fallback),
        }
    }

    #[test]
    fn no_common_unique_atoms_requests_fallback() {
        assert_eq!(run(b"a\na\n", b"b\nb\n"), Err(Outcome::Fallback));
        assert_eq!(run(b"", b"x\n"), Err(Outcome::Fallback));
    }

    #[test]
    fn reordered_unique_lines() {
        let chunks = run(b"1\n2\n3\n4\n", b"1\n4\n2\n3\n").unwrap();
        // "1" anchors, "2" swallows "3", "4" keeps its place in the LCS
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].kind(), ChunkKind::Equal);
        assert_eq!(chunks[0].left, 0..1);
        assert_eq!(chunks[1].kind(), ChunkKind::Removal);
        assert_eq!(chunks[1].left, 1..3);
        assert_eq!(chunks[2].kind(), ChunkKind::Equal);
        assert_eq!(chunks[2].left, 3..4);
        assert_eq!(chunks[2].right, 1..2);
        assert_eq!(chunks[3].kind(), ChunkKind::Addition);
        assert_eq!(chunks[3].right, 2..4);
    }

    #[test]
    fn anchors_swallow_identical_neighbours() {
        // "x" occurs twice per side and is no anchor by itself, but both
        // copies ride along with the "a" anchor's extension, so the whole
        // middle becomes one equal run
        let chunks = run(b"a\nx\nb\nx\n", b"p\na\nx\nb\nx\nq\n").unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].kind(), ChunkKind::Addition);
        assert_eq!(chunks[0].right, 0..1);
        assert_eq!(chunks[1].kind(), ChunkKind::Equal);
        assert_eq!(chunks[1].left, 0..4);
        assert_eq!(chunks[1].right, 1..5);
        assert_eq!(chunks[2].kind(), ChunkKind::Addition);
        assert_eq!(chunks[2].right, 5..6);
    }

    #[test]
    fn swallowed_anchors_are_demoted() {
        // "b" is an anchor of its own but sits inside the run swallowed
        // around "a"; it must not anchor a second equal chunk
        let chunks = run(b"a\nb\nc\n", b"a\nb\nd\n").unwrap();
        assert_eq!(chunks[0].kind(), ChunkKind::Equal);
        assert_eq!(chunks[0].left, 0..2);
        let equal_runs = chunks.iter().filter(|c| c.is_equal()).count();
        assert_eq!(equal_runs, 1);
    }

    #[test]
    fn gaps_between_anchors_are_unsolved() {
        let chunks = run(b"a\nq\nr\nb\n", b"a\ns\nb\n").unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].kind(), ChunkKind::Equal);
        assert_eq!(chunks[1].kind(), ChunkKind::Unsolved);
        assert_eq!(chunks[1].left, 1..3);
        assert_eq!(chunks[1].right, 1..2);
        assert_eq!(chunks[2].kind(), ChunkKind::Equal);
    }

    #[test]
    fn repeated_contents_never_anchor() {
        // "x" appears twice on the left, once on the right; grouped
        // counting must keep it out of the anchor set
        let chunks = run(b"x\n1\nx\n", b"x\n1\n").unwrap();
        for chunk in &chunks {
            if chunk.is_equal() {
                assert!(chunk.left.end - chunk.left.start <= 2);
            }
        }
    }
}
