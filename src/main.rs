//! Command-line front end: diff two files.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cascade_diff::{format, DiffConfig};
use clap::Parser;
use memmap2::Mmap;
use tracing_subscriber::EnvFilter;

/// Compare two files line by line.
#[derive(Parser)]
#[command(name = "cascade-diff", version, about)]
struct Cli {
    /// Output a unified diff with 3 lines of context.
    #[arg(short = 'u')]
    unified: bool,

    /// Output a unified diff with NUM lines of context.
    #[arg(short = 'U', value_name = "NUM")]
    unified_context: Option<u32>,

    /// Output a copied-context diff with 3 lines of context.
    #[arg(short = 'c')]
    context: bool,

    /// Output a copied-context diff with NUM lines of context.
    #[arg(short = 'C', value_name = "NUM")]
    context_lines: Option<u32>,

    /// Output an ed script.
    #[arg(short = 'e')]
    ed: bool,

    /// Output a forward ed script.
    #[arg(short = 'f')]
    forward_ed: bool,

    /// The original file.
    left: PathBuf,

    /// The changed file.
    right: PathBuf,
}

enum OutputFormat {
    Plain,
    Unified(u32),
    Context(u32),
    Ed,
    ForwardEd,
}

impl Cli {
    fn output_format(&self) -> OutputFormat {
        if let Some(context) = self.unified_context {
            OutputFormat::Unified(context)
        } else if self.unified {
            OutputFormat::Unified(3)
        } else if let Some(context) = self.context_lines {
            OutputFormat::Context(context)
        } else if self.context {
            OutputFormat::Context(3)
        } else if self.ed {
            OutputFormat::Ed
        } else if self.forward_ed {
            OutputFormat::ForwardEd
        } else {
            OutputFormat::Plain
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();

    let left = map_file(&cli.left)?;
    let right = map_file(&cli.right)?;
    let result = DiffConfig::default()
        .diff(bytes(&left), bytes(&right))
        .context("diff failed")?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match cli.output_format() {
        OutputFormat::Plain => format::write_plain(&result, &mut out)?,
        OutputFormat::Unified(context) => {
            writeln!(out, "--- {}", cli.left.display())?;
            writeln!(out, "+++ {}", cli.right.display())?;
            format::write_unified(&result, context, &mut out)?;
        }
        OutputFormat::Context(context) => {
            writeln!(out, "*** {}", cli.left.display())?;
            writeln!(out, "--- {}", cli.right.display())?;
            format::write_context(&result, context, &mut out)?;
        }
        OutputFormat::Ed => format::write_ed(&result, false, &mut out)?,
        OutputFormat::ForwardEd => format::write_ed(&result, true, &mut out)?,
    }
    out.flush()?;
    Ok(())
}

/// Maps a file into memory. Empty files cannot be mapped and read as an
/// empty slice instead.
fn map_file(path: &Path) -> Result<Option<Mmap>> {
    let file =
        File::open(path).with_context(|| format!("cannot open '{}'", path.display()))?;
    let len = file
        .metadata()
        .with_context(|| format!("cannot stat '{}'", path.display()))?
        .len();
    if len == 0 {
        return Ok(None);
    }
    let map = unsafe { Mmap::map(&file) }
        .with_context(|| format!("cannot map '{}'", path.display()))?;
    Ok(Some(map))
}

fn bytes(map: &Option<Mmap>) -> &[u8] {
    map.as_deref().unwrap_or(&[])
}
