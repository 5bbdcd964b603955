//! Source processing: comment classification, marker splitting and field
//! parsing, feeding blocks into a `DocumentBuilder`.

pub mod content;
pub mod markup;
pub mod source;

use crate::document::{Document, DocumentBuilder};
use crate::model::{Location, Marker};
use anyhow::{Context, Result};
use log::debug;
use markup::RawMarker;
use source::SourceLine;
use std::fs;
use std::path::Path;

/// Parses files into one document. The current section carries over from
/// one file to the next.
#[derive(Debug, Default)]
pub struct SourceProcessor {
    builder: DocumentBuilder,
}

impl SourceProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and parse one file. Invalid UTF-8 is replaced, not rejected.
    pub fn read_file(&mut self, path: &Path) -> Result<usize> {
        let bytes =
            fs::read(path).with_context(|| format!("couldn't read '{}'", path.display()))?;
        Ok(self.parse_file(path, &String::from_utf8_lossy(&bytes)))
    }

    /// Parse `text` as the contents of `path`, returning the number of
    /// blocks added.
    pub fn parse_file(&mut self, path: &Path, text: &str) -> usize {
        let mut added = 0;
        for comment in source::classify(text) {
            let markers: Vec<Marker> = markup::split_markers(&comment.lines)
                .iter()
                .map(RawMarker::parse)
                .collect();
            let location = Location {
                path: path.to_path_buf(),
                lineno: comment.lineno,
            };
            if markers.is_empty() {
                debug!("{}: comment has no markers", location);
                continue;
            }
            if self
                .builder
                .add_block(markers, excerpt(&comment.code), location)
                .is_some()
            {
                added += 1;
            }
        }
        debug!("{}: {} blocks", path.display(), added);
        added
    }

    pub fn finish(self) -> Document {
        self.builder.finish()
    }
}

/// Source lines without leading and trailing blank lines.
fn excerpt(code: &[SourceLine]) -> Vec<String> {
    let start = code.iter().position(|l| !l.is_blank()).unwrap_or(code.len());
    let end = code.iter().rposition(|l| !l.is_blank()).map_or(start, |i| i + 1);
    code[start..end].iter().map(|l| l.text.clone()).collect()
}
