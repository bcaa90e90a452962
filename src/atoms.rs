use std::ops::Range;

/// The indivisible unit of comparison: a contiguous byte range of a root
/// buffer plus a cheap rolling hash of the line body.
///
/// Atoms carry content only. All algorithm bookkeeping lives in scratch
/// tables owned by the currently running algorithm, so nested invocations
/// on subsections can never observe each other's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Atom {
    /// Byte offset of the atom in the root buffer.
    pub start: u32,
    /// Length in bytes, including the line terminator.
    pub len: u32,
    /// Rolling hash of the bytes before the terminator.
    pub hash: u32,
}

impl Atom {
    /// The byte range `[start, start + len)` covered by this atom.
    pub fn range(&self) -> Range<usize> {
        self.start as usize..(self.start + self.len) as usize
    }
}

/// One side of a diff: the full input buffer plus the atoms produced by
/// the [atomizer](crate::Atomizer).
///
/// A `DiffData` is the root that all [`Section`]s of one side borrow
/// from; atom indices handed out by the engine (for example in
/// [`Chunk`](crate::Chunk) ranges) are global indices into this root.
pub struct DiffData<'a> {
    data: &'a [u8],
    atoms: Vec<Atom>,
}

impl<'a> DiffData<'a> {
    pub(crate) fn new(data: &'a [u8], atoms: Vec<Atom>) -> DiffData<'a> {
        DiffData { data, atoms }
    }

    /// The raw input bytes of this side.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// All atoms of this side, in input order.
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Number of atoms on this side.
    pub fn len(&self) -> u32 {
        self.atoms.len() as u32
    }

    /// True when this side atomized to nothing.
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// The bytes of the atom at the given global index, terminator
    /// included.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of bounds.
    pub fn atom_bytes(&self, idx: u32) -> &'a [u8] {
        &self.data[self.atoms[idx as usize].range()]
    }

    pub(crate) fn section(&self, range: Range<u32>) -> Section<'_, 'a> {
        debug_assert!(range.start <= range.end && range.end <= self.len());
        Section {
            root: self,
            start: range.start,
            len: range.end - range.start,
        }
    }

    pub(crate) fn whole(&self) -> Section<'_, 'a> {
        self.section(0..self.len())
    }
}

/// A contiguous atom range borrowed from a root [`DiffData`], used as the
/// input of one recursive diff frame.
///
/// Local indices are relative to the subsection; `start` is the fixed
/// offset that converts them back to global indices on the root.
#[derive(Clone, Copy)]
pub(crate) struct Section<'d, 'a> {
    root: &'d DiffData<'a>,
    start: u32,
    len: u32,
}

impl<'d, 'a> Section<'d, 'a> {
    pub(crate) fn root(&self) -> &'d DiffData<'a> {
        self.root
    }

    pub(crate) fn len(&self) -> u32 {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Converts a local atom index to a global index on the root.
    pub(crate) fn global(&self, local: u32) -> u32 {
        debug_assert!(local <= self.len);
        self.start + local
    }

    /// Converts a local atom range to a global range on the root.
    pub(crate) fn global_range(&self, local: Range<u32>) -> Range<u32> {
        self.global(local.start)..self.global(local.end)
    }

    pub(crate) fn atom(&self, local: u32) -> &'d Atom {
        &self.root.atoms[(self.start + local) as usize]
    }

    /// The bytes of the atom at the given local index.
    pub(crate) fn bytes(&self, local: u32) -> &'a [u8] {
        &self.root.data[self.atom(local).range()]
    }

    /// Atom equality: hashes equal, lengths equal, bytes equal.
    pub(crate) fn atoms_eq(&self, i: u32, other: &Section<'_, 'a>, j: u32) -> bool {
        let a = self.atom(i);
        let b = other.atom(j);
        a.hash == b.hash && a.len == b.len && self.bytes(i) == other.bytes(j)
    }
}
