//! Splitting raw bytes into [atoms](Atom).
//!
//! The default [`Lines`] atomizer produces one atom per line. Atomizers
//! are handed both sides in a single call so that future strategies may
//! use cross-side information (for example a shared token table).

use memchr::memchr2;

use crate::atoms::{Atom, DiffData};

/// Strategy that splits the two input buffers into atoms.
pub trait Atomizer {
    /// Atomizes both sides of the diff. The returned roots own the atom
    /// arrays for the lifetime of the diff result.
    fn atomize<'a>(&self, left: &'a [u8], right: &'a [u8]) -> (DiffData<'a>, DiffData<'a>);
}

/// The default line-by-line atomizer.
///
/// A line ends at the first `\n` or `\r`; a `\r\n` pair is coalesced into
/// a single terminator belonging to the preceding line. An unterminated
/// trailing line forms its own atom.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lines;

impl Atomizer for Lines {
    fn atomize<'a>(&self, left: &'a [u8], right: &'a [u8]) -> (DiffData<'a>, DiffData<'a>) {
        (
            DiffData::new(left, split_lines(left)),
            DiffData::new(right, split_lines(right)),
        )
    }
}

fn split_lines(data: &[u8]) -> Vec<Atom> {
    // lines average well above 2 bytes, so this rarely reallocates
    let capacity = data.len().div_ceil(50).next_power_of_two();
    let mut atoms = Vec::with_capacity(capacity);
    let mut pos = 0;
    while pos < data.len() {
        let rest = &data[pos..];
        let (body, terminator) = match memchr2(b'\n', b'\r', rest) {
            Some(at) if rest[at] == b'\r' && rest.get(at + 1) == Some(&b'\n') => (at, 2),
            Some(at) => (at, 1),
            None => (rest.len(), 0),
        };
        let mut hash = 0u32;
        for &byte in &rest[..body] {
            hash = hash.wrapping_mul(23).wrapping_add(byte as u32);
        }
        atoms.push(Atom {
            start: pos as u32,
            len: (body + terminator) as u32,
            hash,
        });
        pos += body + terminator;
    }
    atoms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(data: &[u8]) -> Vec<&[u8]> {
        let root = DiffData::new(data, split_lines(data));
        (0..root.len()).map(|i| root.atom_bytes(i)).collect()
    }

    #[test]
    fn splits_at_lf() {
        assert_eq!(lines(b"a\nbc\n"), [b"a\n".as_slice(), b"bc\n"]);
    }

    #[test]
    fn unterminated_tail_is_an_atom() {
        assert_eq!(lines(b"a\nb"), [b"a\n".as_slice(), b"b"]);
        assert_eq!(lines(b""), Vec::<&[u8]>::new());
    }

    #[test]
    fn crlf_is_one_terminator() {
        assert_eq!(lines(b"a\r\nb\rc\n"), [b"a\r\n".as_slice(), b"b\r", b"c\n"]);
        // a lone \r ends the line even when the \n opens the next one
        assert_eq!(lines(b"a\r\r\n"), [b"a\r".as_slice(), b"\r\n"]);
    }

    #[test]
    fn concatenation_reproduces_input() {
        for data in [
            b"".as_slice(),
            b"one\ntwo\r\nthree\rfour",
            b"\n\n\r\n",
            b"no newline",
        ] {
            let atoms = split_lines(data);
            let total: usize = atoms.iter().map(|atom| atom.len as usize).sum();
            assert_eq!(total, data.len());
            let mut offset = 0;
            for atom in &atoms {
                assert_eq!(atom.start as usize, offset);
                offset += atom.len as usize;
            }
        }
    }

    #[test]
    fn hash_skips_the_terminator() {
        let atoms = split_lines(b"ab\n");
        assert_eq!(atoms[0].hash, 97 * 23 + 98);
        // hash covers the body only, so it matches across terminators
        let crlf = split_lines(b"ab\r\n");
        assert_eq!(atoms[0].hash, crlf[0].hash);
    }
}
