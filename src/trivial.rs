//! The terminal algorithm: equal prefix, then everything removed, then
//! everything added. Always succeeds, so it serves both as the final
//! fallback and as the bounded-depth escape hatch.

use crate::atoms::Section;
use crate::chunk::Accumulator;
use crate::engine::Outcome;
use crate::Error;

pub(crate) fn diff(
    left: Section<'_, '_>,
    right: Section<'_, '_>,
    acc: &mut Accumulator<'_>,
) -> Result<Outcome, Error> {
    let mut prefix = 0;
    while prefix < left.len() && prefix < right.len() && left.atoms_eq(prefix, &right, prefix) {
        prefix += 1;
    }
    acc.add(true, left.global_range(0..prefix), right.global_range(0..prefix));
    acc.add(
        true,
        left.global_range(prefix..left.len()),
        right.global_range(prefix..prefix),
    );
    acc.add(
        true,
        left.global_range(left.len()..left.len()),
        right.global_range(prefix..right.len()),
    );
    Ok(Outcome::Solved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atomize::{Atomizer, Lines};
    use crate::chunk::ChunkKind;
    use crate::Chunk;

    fn run(left: &[u8], right: &[u8]) -> Vec<Chunk> {
        let (left, right) = Lines.atomize(left, right);
        let mut result = Vec::new();
        let mut tmp = Vec::new();
        let mut acc = Accumulator::new(&mut result, &mut tmp);
        let outcome = diff(left.whole(), right.whole(), &mut acc).unwrap();
        assert_eq!(outcome, Outcome::Solved);
        assert!(tmp.is_empty());
        result
    }

    #[test]
    fn equal_prefix_then_minus_then_plus() {
        let chunks = run(b"a\nb\nc\n", b"a\nx\n");
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].kind(), ChunkKind::Equal);
        assert_eq!(chunks[0].left, 0..1);
        assert_eq!(chunks[1].kind(), ChunkKind::Removal);
        assert_eq!(chunks[1].left, 1..3);
        assert_eq!(chunks[2].kind(), ChunkKind::Addition);
        assert_eq!(chunks[2].right, 1..2);
    }

    #[test]
    fn identical_inputs_become_one_equal_chunk() {
        let chunks = run(b"a\nb\n", b"a\nb\n");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].kind(), ChunkKind::Equal);
        assert_eq!(chunks[0].left, 0..2);
    }

    #[test]
    fn empty_sides() {
        assert!(run(b"", b"").is_empty());
        let plus = run(b"", b"x\n");
        assert_eq!(plus.len(), 1);
        assert_eq!(plus[0].kind(), ChunkKind::Addition);
        let minus = run(b"x\n", b"");
        assert_eq!(minus.len(), 1);
        assert_eq!(minus[0].kind(), ChunkKind::Removal);
    }
}
