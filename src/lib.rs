#![deny(missing_docs)]
//! cascade-diff computes a minimal-edit, line-oriented diff between two
//! byte buffers and returns it as an ordered stream of chunks: equal
//! runs, removals and additions.
//!
//! The engine is a cascade of cooperating algorithms rather than a
//! single one. Every algorithm shares a uniform contract: given a
//! bounded subsection of both inputs it either solves it outright,
//! produces a mixture of solved chunks and unsolved subproblems for a
//! nested pass, or declares that its configured alternate should run
//! instead. The orchestrator recurses through this tree until every
//! chunk is solved. The standard composition starts with the full
//! [Myers](Algorithm::Myers) search, hands large inputs to
//! [patience](Algorithm::Patience) diffing, and resolves patience's
//! anchor gaps with the linear-space
//! [divide-and-conquer Myers](Algorithm::MyersDivide).
//!
//! # Computing a diff
//!
//! Inputs are plain byte slices; the [`Lines`] atomizer splits them into
//! one atom per line by default.
//!
//! ```
//! # use cascade_diff::{ChunkKind, DiffConfig};
//! #
//! let before = b"fn foo() {\n    bar();\n}\n";
//! let after = b"fn foo() {\n    baz();\n}\n";
//! let config = DiffConfig::default();
//! let diff = config.diff(before, after).unwrap();
//!
//! let kinds: Vec<_> = diff.chunks().iter().map(|chunk| chunk.kind()).collect();
//! assert_eq!(
//!     kinds,
//!     [
//!         ChunkKind::Equal,
//!         ChunkKind::Removal,
//!         ChunkKind::Addition,
//!         ChunkKind::Equal,
//!     ]
//! );
//! ```
//!
//! # Accessing results
//!
//! [`DiffResult`] exposes the chunk list plus both
//! [roots](DiffData), which map atom indices back to line numbers and
//! bytes. That mapping is what the formatters in [`format`] consume:
//!
//! ```
//! # use cascade_diff::{format, DiffConfig};
//! #
//! let diff = DiffConfig::default()
//!     .diff(b"a\nb\nc\n", b"a\nx\nc\n")
//!     .unwrap();
//! let mut out = Vec::new();
//! format::write_unified(&diff, 1, &mut out).unwrap();
//! assert_eq!(
//!     String::from_utf8(out).unwrap(),
//!     "@@ -1,3 +1,3 @@\n a\n-b\n+x\n c\n"
//! );
//! ```
//!
//! # Choosing a composition
//!
//! [`AlgorithmTree`] describes which algorithm runs first, what it falls
//! back to, and what refines its unsolved chunks. [`AlgorithmTree::standard`]
//! is the right choice almost always; hand-built trees are mostly useful
//! for pinning down a single algorithm:
//!
//! ```
//! # use cascade_diff::{Algorithm, AlgorithmTree, DiffConfig};
//! #
//! let config = DiffConfig {
//!     tree: AlgorithmTree::single(Algorithm::MyersDivide),
//!     max_recursion_depth: 0,
//! };
//! let diff = config.diff(b"a\n", b"a\n").unwrap();
//! assert!(diff.is_identical());
//! ```

use std::fmt;

pub use crate::atomize::{Atomizer, Lines};
pub use crate::atoms::{Atom, DiffData};
pub use crate::chunk::{Chunk, ChunkKind};
pub use crate::engine::{
    AlgoId, AlgorithmNode, AlgorithmTree, DEFAULT_MYERS_STATE_SIZE, DEFAULT_RECURSION_DEPTH,
};

mod atomize;
mod atoms;
mod chunk;
mod engine;
#[cfg(feature = "format")]
pub mod format;
mod myers;
mod patience;
mod trivial;

#[cfg(test)]
mod tests;

/// The diff algorithms an [`AlgorithmNode`] can run.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum Algorithm {
    /// The classical full-matrix variant of
    /// [Myers' `O((N+M)D)` algorithm](http://www.xmailserver.org/diff2.pdf).
    /// It produces minimal edit scripts and solves its whole subsection
    /// in one pass, but keeps one furthest-reaching column per edit
    /// distance, so its state grows quadratically. The node's
    /// `permitted_state_size` caps that state; inputs over the cap are
    /// handed to the fallback.
    #[default]
    Myers,
    /// The linear-space variant of Myers' algorithm. A forward and a
    /// backward sweep meet on a mid-snake, which splits the problem into
    /// two smaller unsolved chunks for the node's inner algorithm. The
    /// memory footprint stays linear no matter the input.
    MyersDivide,
    /// The [patience diff algorithm](https://bramcohen.livejournal.com/73318.html):
    /// lines occurring exactly once on both sides anchor the diff, the
    /// longest common subsequence of those anchors is found by patience
    /// sorting, and only the gaps between anchors are diffed further.
    /// Usually produces more readable output than Myers on real-world
    /// text, but needs at least one common-unique line to make progress.
    Patience,
    /// Records the longest equal prefix, then everything removed, then
    /// everything added. Never fails and never recurses; the terminal
    /// fallback and the bounded-depth escape hatch.
    Trivial,
}

/// Errors surfaced by [`DiffConfig::diff`].
///
/// Fallback requests between algorithms are internal and never show up
/// here; an exhausted recursion depth is not an error either, it
/// resolves the remaining subsections trivially.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The combined input size exceeds the addressable atom range.
    /// Produced by the entry point before any work begins.
    #[error("inputs are too large to diff (combined size must stay below {} bytes)", i32::MAX)]
    TooLarge,
    /// An algorithm's working state could not be allocated. Partial
    /// results are dropped on the way out.
    #[error("out of memory while allocating diff state")]
    OutOfMemory,
}

/// Configuration of one diff invocation: the algorithm composition and
/// the recursion depth cap.
#[derive(Debug, Clone, Default)]
pub struct DiffConfig {
    /// The algorithm composition to run, see [`AlgorithmTree`].
    pub tree: AlgorithmTree,
    /// Maximum depth of nested algorithm invocations. 0 means
    /// [`DEFAULT_RECURSION_DEPTH`]. Subsections that would exceed the
    /// cap are resolved by the trivial algorithm.
    pub max_recursion_depth: u32,
}

impl DiffConfig {
    /// Diffs two byte buffers, splitting them into lines with the
    /// default [`Lines`] atomizer.
    pub fn diff<'a>(&self, left: &'a [u8], right: &'a [u8]) -> Result<DiffResult<'a>, Error> {
        self.diff_with(&Lines, left, right)
    }

    /// Diffs two byte buffers split into atoms by `atomizer`.
    pub fn diff_with<'a>(
        &self,
        atomizer: &impl Atomizer,
        left: &'a [u8],
        right: &'a [u8],
    ) -> Result<DiffResult<'a>, Error> {
        if left.len() as u64 + right.len() as u64 >= i32::MAX as u64 {
            return Err(Error::TooLarge);
        }
        let (left, right) = atomizer.atomize(left, right);
        let depth = if self.max_recursion_depth == 0 {
            DEFAULT_RECURSION_DEPTH
        } else {
            self.max_recursion_depth
        };
        let mut chunks = Vec::new();
        engine::Engine::new(&self.tree, &mut chunks).run(
            Some(self.tree.root()),
            left.whole(),
            right.whole(),
            depth,
        )?;
        Ok(DiffResult {
            left,
            right,
            chunks,
        })
    }
}

/// Diffs two byte buffers with the standard configuration.
pub fn diff<'a>(left: &'a [u8], right: &'a [u8]) -> Result<DiffResult<'a>, Error> {
    DiffConfig::default().diff(left, right)
}

/// The outcome of a diff: both roots plus the ordered list of solved
/// chunks.
///
/// The chunks' left spans concatenate to exactly the left atom sequence,
/// the right spans to the right one, and equal runs are maximal.
pub struct DiffResult<'a> {
    left: DiffData<'a>,
    right: DiffData<'a>,
    chunks: Vec<Chunk>,
}

impl<'a> DiffResult<'a> {
    /// The left root: input bytes and atoms of the first buffer.
    pub fn left(&self) -> &DiffData<'a> {
        &self.left
    }

    /// The right root: input bytes and atoms of the second buffer.
    pub fn right(&self) -> &DiffData<'a> {
        &self.right
    }

    /// All chunks in left-to-right order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// True when the inputs atomized to identical sequences.
    pub fn is_identical(&self) -> bool {
        self.chunks.iter().all(Chunk::is_equal)
    }

    /// Total number of removed atoms.
    pub fn count_removals(&self) -> u32 {
        self.chunks
            .iter()
            .filter(|c| c.is_removal())
            .map(|c| c.left.end - c.left.start)
            .sum()
    }

    /// Total number of added atoms.
    pub fn count_additions(&self) -> u32 {
        self.chunks
            .iter()
            .filter(|c| c.is_addition())
            .map(|c| c.right.end - c.right.start)
            .sum()
    }
}

impl fmt::Debug for DiffResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.chunks).finish()
    }
}
