//! docwriter: generate API reference pages from framed documentation
//! comments in C headers.
//!
//! ```text
//! docwriter -t FreeType -p ft2 -f html -o docs/reference include/freetype/*.h
//! ```
//!
//! Writes a table of contents, a global index and one page per section.

mod anchor;
mod document;
mod files;
mod model;
mod parser;
mod render;
#[cfg(test)]
mod testlog;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{debug, info, LevelFilter};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "docwriter",
    version,
    about = "Generate HTML or Markdown API references from documentation comments in C headers"
)]
struct Cli {
    /// Input files (glob patterns supported)
    #[arg(required = true)]
    files: Vec<String>,

    /// Project title used in page headings
    #[arg(short = 't', long, default_value = "Project")]
    title: String,

    /// Existing output directory
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Output file prefix; `ft2` gives `ft2-toc.html`
    #[arg(short = 'p', long, default_value = "")]
    prefix: String,

    /// Output format: markdown (default, alias md) or html
    #[arg(short = 'f', long, default_value = "markdown")]
    format: String,

    /// Only report errors
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    quiet: bool,

    /// Report debug messages
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);
    run(&cli)
}

/// `RUST_LOG` overrides the level picked from `--quiet`/`--verbose`.
fn init_logging(cli: &Cli) {
    env_logger::Builder::new()
        .filter_level(log_level(cli))
        .parse_default_env()
        .format(|buf, record| writeln!(buf, "{:<7} -  {}", record.level(), record.args()))
        .init();
}

fn log_level(cli: &Cli) -> LevelFilter {
    if cli.quiet {
        LevelFilter::Error
    } else if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

fn run(cli: &Cli) -> Result<()> {
    // fail on configuration problems before touching any input
    let format = render::Format::from_name(&cli.format)?;
    if !cli.output.is_dir() {
        bail!("output directory '{}' doesn't exist", cli.output.display());
    }
    let files = files::make_file_list(&cli.files)?;

    let mut processor = parser::SourceProcessor::new();
    for path in &files {
        debug!("parsing {}", path.display());
        processor.read_file(path)?;
    }
    let doc = processor.finish();
    info!(
        "{} blocks in {} sections from {} files",
        doc.blocks.len(),
        doc.sections.len(),
        files.len()
    );
    if !doc.conflicts.is_empty() {
        info!("{} duplicate definitions ignored", doc.conflicts.len());
        for conflict in &doc.conflicts {
            debug!(
                "{}: '{}' resolves to {}",
                conflict.location, conflict.name, conflict.previous
            );
        }
    }

    let formatter = format.create(&doc, &cli.title, &cli.prefix);
    let pages = render::dump_all(formatter.as_ref());
    for page in &pages {
        let path = cli.output.join(&page.file_name);
        fs::write(&path, &page.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        debug!("wrote {}", path.display());
    }
    info!("wrote {} pages to {}", pages.len(), cli.output.display());

    Ok(())
}
