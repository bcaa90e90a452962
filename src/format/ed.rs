use std::io::{self, Write};
use std::ops::Range;

use super::{count, write_line};
use crate::{Chunk, DiffResult};

// TODO a change line consisting of only "." terminates the command
// early; needs the classic split-into-two-commands workaround

/// Writes the diff as an ed script (`diff -e`): delete/append/change
/// commands addressed by line numbers in the left file, last change
/// first so earlier addresses stay valid while ed applies them.
///
/// With `forward` set the output is the forward variant (`diff -f`):
/// first change first and the command letter ahead of the addresses. It
/// is not consumable by ed.
pub fn write_ed(result: &DiffResult<'_>, forward: bool, mut out: impl Write) -> io::Result<()> {
    let commands = commands(result.chunks());
    if forward {
        for command in &commands {
            write_forward(result, command, &mut out)?;
        }
    } else {
        for command in commands.iter().rev() {
            write_reverse(result, command, &mut out)?;
        }
    }
    Ok(())
}

/// One ed command: the left lines it replaces and the right lines it
/// inserts. Deletes have an empty right range, appends an empty left
/// range anchored at the line they follow.
struct Command {
    left: Range<u32>,
    right: Range<u32>,
}

impl Command {
    fn letter(&self) -> u8 {
        if count(&self.right) == 0 {
            b'd'
        } else if count(&self.left) == 0 {
            b'a'
        } else {
            b'c'
        }
    }
}

fn commands(chunks: &[Chunk]) -> Vec<Command> {
    let mut commands = Vec::new();
    let mut i = 0;
    while i < chunks.len() {
        let chunk = &chunks[i];
        if chunk.is_equal() {
            i += 1;
            continue;
        }
        // a removal directly followed by an addition is one change
        if chunk.is_removal() && chunks.get(i + 1).is_some_and(Chunk::is_addition) {
            commands.push(Command {
                left: chunk.left.clone(),
                right: chunks[i + 1].right.clone(),
            });
            i += 2;
        } else {
            commands.push(Command {
                left: chunk.left.clone(),
                right: chunk.right.clone(),
            });
            i += 1;
        }
    }
    commands
}

fn write_reverse(
    result: &DiffResult<'_>,
    command: &Command,
    out: &mut impl Write,
) -> io::Result<()> {
    let letter = command.letter();
    match (letter, count(&command.left)) {
        (b'a', _) => writeln!(out, "{}a", command.left.start)?,
        (_, 1) => writeln!(out, "{}{}", command.left.start + 1, letter as char)?,
        _ => writeln!(
            out,
            "{},{}{}",
            command.left.start + 1,
            command.left.end,
            letter as char
        )?,
    }
    write_text(result, command, out)
}

fn write_forward(
    result: &DiffResult<'_>,
    command: &Command,
    out: &mut impl Write,
) -> io::Result<()> {
    let letter = command.letter() as char;
    match (command.letter(), count(&command.left)) {
        (b'a', _) => writeln!(out, "{}{}", letter, command.left.start)?,
        (_, 1) => writeln!(out, "{}{}", letter, command.left.start + 1)?,
        _ => writeln!(
            out,
            "{}{} {}",
            letter,
            command.left.start + 1,
            command.left.end
        )?,
    }
    write_text(result, command, out)
}

fn write_text(result: &DiffResult<'_>, command: &Command, out: &mut impl Write) -> io::Result<()> {
    if command.letter() == b'd' {
        return Ok(());
    }
    for i in command.right.clone() {
        write_line(out, b"", result.right().atom_bytes(i))?;
    }
    writeln!(out, ".")
}
