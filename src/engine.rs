use tracing::{debug, trace};

use crate::atoms::Section;
use crate::chunk::{push_solved, Accumulator, Chunk};
use crate::{myers, patience, trivial, Algorithm, Error};

/// Recursion depth used when [`DiffConfig`](crate::DiffConfig) leaves
/// `max_recursion_depth` at 0.
pub const DEFAULT_RECURSION_DEPTH: u32 = 1024;

/// Default byte budget for the quadratic Myers state, 4 MiB. Inputs
/// whose edit graph needs more state make Myers hand over to its
/// fallback.
pub const DEFAULT_MYERS_STATE_SIZE: usize = 4 << 20;

/// What an algorithm reports back to the orchestrator. Errors travel
/// separately as [`Error`]. An algorithm may only ask for its fallback
/// before it has recorded any chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Solved,
    Fallback,
}

/// Identifies a node inside an [`AlgorithmTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlgoId(u32);

/// One node of the algorithm composition: which algorithm to run, its
/// state budget, and where to go next.
#[derive(Debug, Clone)]
pub struct AlgorithmNode {
    /// The algorithm this node runs.
    pub algorithm: Algorithm,
    /// Byte cap for the quadratic Myers state; 0 disables the cap. Only
    /// meaningful for [`Algorithm::Myers`].
    pub permitted_state_size: usize,
    /// Algorithm used to refine unsolved chunks this node emits.
    /// `None` resolves them with the trivial algorithm.
    pub inner: Option<AlgoId>,
    /// Algorithm to run instead when this node cannot or will not
    /// proceed. `None` means the trivial algorithm.
    pub fallback: Option<AlgoId>,
}

/// The algorithm composition as an arena of [`AlgorithmNode`]s.
///
/// `inner` and `fallback` edges are ids into the arena, so they may
/// reference nodes in any direction, including the node itself; the
/// standard composition points patience at itself for subdivision.
#[derive(Debug, Clone)]
pub struct AlgorithmTree {
    nodes: Vec<AlgorithmNode>,
    root: AlgoId,
}

impl AlgorithmTree {
    /// An empty tree; push nodes and pick a root before use.
    pub fn empty() -> AlgorithmTree {
        AlgorithmTree {
            nodes: Vec::new(),
            root: AlgoId(0),
        }
    }

    /// The standard composition:
    ///
    /// ```text
    /// myers  --(state too large)--> patience --(subdivide inner)--> patience
    ///                                   |--(no common-unique)--> myers_divide
    ///                                                              |--(inner)--> myers
    ///                                                              |--(no midpoint)--> trivial
    /// ```
    pub fn standard() -> AlgorithmTree {
        let mut tree = AlgorithmTree::empty();
        let myers = tree.push(AlgorithmNode {
            algorithm: Algorithm::Myers,
            permitted_state_size: DEFAULT_MYERS_STATE_SIZE,
            inner: None,
            fallback: None,
        });
        let patience = tree.push(AlgorithmNode {
            algorithm: Algorithm::Patience,
            permitted_state_size: 0,
            inner: None,
            fallback: None,
        });
        let divide = tree.push(AlgorithmNode {
            algorithm: Algorithm::MyersDivide,
            permitted_state_size: 0,
            inner: Some(myers),
            fallback: None,
        });
        tree.node_mut(myers).fallback = Some(patience);
        tree.node_mut(patience).inner = Some(patience);
        tree.node_mut(patience).fallback = Some(divide);
        tree.root = myers;
        tree
    }

    /// A tree with a single node and no fallback. The node subdivides
    /// into itself, which makes `single(Algorithm::MyersDivide)` the
    /// plain linear-space Myers algorithm.
    pub fn single(algorithm: Algorithm) -> AlgorithmTree {
        let mut tree = AlgorithmTree::empty();
        let id = tree.push(AlgorithmNode {
            algorithm,
            permitted_state_size: 0,
            inner: None,
            fallback: None,
        });
        tree.node_mut(id).inner = Some(id);
        tree.root = id;
        tree
    }

    /// Appends a node and returns its id.
    pub fn push(&mut self, node: AlgorithmNode) -> AlgoId {
        let id = AlgoId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// The node behind an id.
    ///
    /// # Panics
    ///
    /// Panics when `id` comes from a different tree and is out of range.
    pub fn node(&self, id: AlgoId) -> &AlgorithmNode {
        &self.nodes[id.0 as usize]
    }

    /// Mutable access to a node, for wiring up `inner` and `fallback`.
    ///
    /// # Panics
    ///
    /// Panics when `id` comes from a different tree and is out of range.
    pub fn node_mut(&mut self, id: AlgoId) -> &mut AlgorithmNode {
        &mut self.nodes[id.0 as usize]
    }

    /// The node a diff starts with.
    pub fn root(&self) -> AlgoId {
        self.root
    }

    /// Picks the node a diff starts with.
    pub fn set_root(&mut self, id: AlgoId) {
        self.root = id;
    }
}

impl Default for AlgorithmTree {
    fn default() -> AlgorithmTree {
        AlgorithmTree::standard()
    }
}

/// Drives the algorithm composition over one pair of inputs and collects
/// the solved chunks.
pub(crate) struct Engine<'t, 'r> {
    tree: &'t AlgorithmTree,
    chunks: &'r mut Vec<Chunk>,
}

impl<'t, 'r> Engine<'t, 'r> {
    pub(crate) fn new(tree: &'t AlgorithmTree, chunks: &'r mut Vec<Chunk>) -> Engine<'t, 'r> {
        Engine { tree, chunks }
    }

    /// Runs `algo` on the subsection pair, promoting its solved chunks
    /// and recursing into each unsolved chunk with the node's inner
    /// algorithm at `depth - 1`. An unset algorithm or an exhausted
    /// depth counter resolves the pair with the trivial algorithm.
    pub(crate) fn run<'d, 'a>(
        &mut self,
        algo: Option<AlgoId>,
        left: Section<'d, 'a>,
        right: Section<'d, 'a>,
        depth: u32,
    ) -> Result<(), Error> {
        let Some(id) = algo else {
            return self.finish_trivial(left, right);
        };
        if depth == 0 {
            debug!("recursion depth exhausted, resolving trivially");
            return self.finish_trivial(left, right);
        }
        let node = self.tree.node(id);
        trace!(
            algorithm = ?node.algorithm,
            left = left.len(),
            right = right.len(),
            depth,
            "running algorithm"
        );
        let mut tmp = Vec::new();
        let outcome = {
            let mut acc = Accumulator::new(self.chunks, &mut tmp);
            match node.algorithm {
                Algorithm::Trivial => trivial::diff(left, right, &mut acc),
                Algorithm::Myers => {
                    myers::diff(left, right, node.permitted_state_size, &mut acc)
                }
                Algorithm::MyersDivide => myers::divide::diff(left, right, &mut acc),
                Algorithm::Patience => patience::diff(left, right, &mut acc),
            }
        }?;
        match outcome {
            Outcome::Fallback => {
                debug_assert!(tmp.is_empty(), "fallback after recording chunks");
                debug!(algorithm = ?node.algorithm, "falling back");
                self.run(node.fallback, left, right, depth)
            }
            Outcome::Solved => {
                for chunk in tmp {
                    if chunk.solved {
                        push_solved(self.chunks, chunk);
                    } else {
                        let sub_left = left.root().section(chunk.left);
                        let sub_right = right.root().section(chunk.right);
                        self.run(node.inner, sub_left, sub_right, depth - 1)?;
                    }
                }
                Ok(())
            }
        }
    }

    fn finish_trivial<'d, 'a>(
        &mut self,
        left: Section<'d, 'a>,
        right: Section<'d, 'a>,
    ) -> Result<(), Error> {
        let mut tmp = Vec::new();
        let mut acc = Accumulator::new(self.chunks, &mut tmp);
        let outcome = trivial::diff(left, right, &mut acc)?;
        debug_assert!(outcome == Outcome::Solved && tmp.is_empty());
        Ok(())
    }
}
