//! Renderer module: document traversal driving `Formatter` hooks.
//!
//! `toc_dump`, `index_dump` and `section_dump` walk the document in its
//! declared order and call the matching hooks; concrete formatters
//! override the hooks they need and write into the page buffer.

pub mod html;
pub mod inline;
pub mod markdown;

use crate::anchor::slugify;
use crate::document::{Block, Chapter, Document, Section, Target};
use crate::model::{Field, Marker};
use anyhow::{anyhow, Result};
use log::debug;

/// One output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub file_name: String,
    pub content: String,
}

/// File names and URLs shared by every formatter.
#[derive(Debug, Clone)]
pub struct Links<'a> {
    doc: &'a Document,
    prefix: String,
    extension: &'static str,
}

impl<'a> Links<'a> {
    /// `prefix` is the bare CLI prefix; a `-` separator is added when it
    /// is non-empty.
    pub fn new(doc: &'a Document, prefix: &str, extension: &'static str) -> Self {
        let prefix = if prefix.is_empty() {
            String::new()
        } else {
            format!("{}-", prefix)
        };
        Self {
            doc,
            prefix,
            extension,
        }
    }

    pub fn doc(&self) -> &'a Document {
        self.doc
    }

    pub fn toc_file(&self) -> String {
        format!("{}toc.{}", self.prefix, self.extension)
    }

    pub fn index_file(&self) -> String {
        format!("{}index.{}", self.prefix, self.extension)
    }

    pub fn section_file(&self, section: &Section) -> String {
        format!("{}{}.{}", self.prefix, slugify(&section.name), self.extension)
    }

    /// `file#anchor` of a block inside its section page.
    pub fn block_url(&self, block: &Block) -> String {
        self.anchor_url(block, &block.name)
    }

    pub fn target_url(&self, name: &str, target: Target) -> String {
        match target {
            Target::Block(id) => self.block_url(self.doc.block(id)),
            Target::Value(id) => self.anchor_url(self.doc.block(id), name),
            Target::Section(id) => self.section_file(self.doc.section(id)),
        }
    }

    fn anchor_url(&self, block: &Block, name: &str) -> String {
        let file = block
            .section
            .map(|id| self.section_file(self.doc.section(id)))
            .unwrap_or_default();
        format!("{}#{}", file, slugify(name))
    }
}

/// Position of a field inside its marker. Consecutive named fields are
/// rendered as one table.
#[derive(Debug, Clone, Copy)]
pub struct FieldPos<'a> {
    pub marker: &'a Marker,
    pub index: usize,
}

impl<'a> FieldPos<'a> {
    pub fn field(&self) -> &'a Field {
        &self.marker.fields[self.index]
    }

    pub fn starts_table(&self) -> bool {
        self.field().is_named() && (self.index == 0 || !self.marker.fields[self.index - 1].is_named())
    }

    pub fn ends_table(&self) -> bool {
        self.field().is_named()
            && self
                .marker
                .fields
                .get(self.index + 1)
                .is_none_or(|next| !next.is_named())
    }

    /// The run of named fields this field belongs to.
    pub fn table_group(&self) -> &'a [Field] {
        let fields = &self.marker.fields;
        if !self.field().is_named() {
            return &fields[self.index..=self.index];
        }
        let start = fields[..self.index]
            .iter()
            .rposition(|f| !f.is_named())
            .map_or(0, |i| i + 1);
        let end = fields[self.index..]
            .iter()
            .position(|f| !f.is_named())
            .map_or(fields.len(), |i| self.index + i);
        &fields[start..end]
    }
}

/// Output hooks called during traversal. Every hook defaults to a no-op.
#[allow(unused_variables)]
pub trait Formatter {
    fn links(&self) -> &Links<'_>;

    // table of contents
    fn toc_enter(&self, out: &mut String) {}
    fn toc_chapter_enter(&self, out: &mut String, chapter: &Chapter) {}
    fn toc_section_enter(&self, out: &mut String, section: &Section) {}
    fn toc_section_exit(&self, out: &mut String, section: &Section) {}
    fn toc_chapter_exit(&self, out: &mut String, chapter: &Chapter) {}
    fn toc_index(&self, out: &mut String) {}
    fn toc_exit(&self, out: &mut String) {}

    // global index
    fn index_enter(&self, out: &mut String) {}
    fn index_name(&self, out: &mut String, name: &str, previous: Option<&str>, target: Target) {}
    fn index_exit(&self, out: &mut String) {}

    // section pages
    fn section_enter(&self, out: &mut String, section: &Section) {}
    fn block_enter(&self, out: &mut String, block: &Block) {}
    fn markup_enter(&self, out: &mut String, marker: &Marker, block: &Block) {}
    fn field_enter(&self, out: &mut String, pos: FieldPos<'_>) {}
    fn field_exit(&self, out: &mut String, pos: FieldPos<'_>) {}
    fn markup_exit(&self, out: &mut String, marker: &Marker, block: &Block) {}
    fn block_exit(&self, out: &mut String, block: &Block) {}
    fn section_exit(&self, out: &mut String, section: &Section) {}
}

pub fn toc_dump(f: &dyn Formatter) -> Page {
    let doc = f.links().doc();
    let mut out = String::new();

    f.toc_enter(&mut out);
    for chapter in &doc.chapters {
        f.toc_chapter_enter(&mut out, chapter);
        for &id in &chapter.sections {
            let section = doc.section(id);
            f.toc_section_enter(&mut out, section);
            f.toc_section_exit(&mut out, section);
        }
        f.toc_chapter_exit(&mut out, chapter);
    }
    f.toc_index(&mut out);
    f.toc_exit(&mut out);

    Page {
        file_name: f.links().toc_file(),
        content: out,
    }
}

pub fn index_dump(f: &dyn Formatter) -> Page {
    let doc = f.links().doc();
    let mut out = String::new();

    f.index_enter(&mut out);
    let mut previous: Option<&str> = None;
    for name in doc.index.names() {
        if let Some(target) = doc.lookup(name) {
            f.index_name(&mut out, name, previous, target);
        }
        previous = Some(name);
    }
    f.index_exit(&mut out);

    Page {
        file_name: f.links().index_file(),
        content: out,
    }
}

pub fn section_dump(f: &dyn Formatter, section: &Section) -> Page {
    let doc = f.links().doc();
    let mut out = String::new();

    f.section_enter(&mut out, section);
    for block in doc.section_blocks(section) {
        f.block_enter(&mut out, block);
        // the heading marker names the block and is not rendered as content
        for marker in block.body() {
            f.markup_enter(&mut out, marker, block);
            for index in 0..marker.fields.len() {
                let pos = FieldPos { marker, index };
                f.field_enter(&mut out, pos);
                f.field_exit(&mut out, pos);
            }
            f.markup_exit(&mut out, marker, block);
        }
        f.block_exit(&mut out, block);
    }
    f.section_exit(&mut out, section);

    Page {
        file_name: f.links().section_file(section),
        content: out,
    }
}

/// TOC, global index, then one page per section in declaration order.
pub fn dump_all(f: &dyn Formatter) -> Vec<Page> {
    let doc = f.links().doc();
    let mut pages = vec![toc_dump(f), index_dump(f)];
    for section in &doc.sections {
        debug!("rendering section '{}'", section.name);
        pages.push(section_dump(f, section));
    }
    pages
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Html,
    Markdown,
}

impl Format {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "html" => Ok(Format::Html),
            "markdown" | "md" => Ok(Format::Markdown),
            _ => Err(anyhow!("unknown format: {}. Use html or markdown", name)),
        }
    }

    /// Create a formatter for the document.
    pub fn create<'a>(self, doc: &'a Document, title: &str, prefix: &str) -> Box<dyn Formatter + 'a> {
        match self {
            Format::Html => Box::new(html::HtmlFormatter::new(doc, title, prefix)),
            Format::Markdown => Box::new(markdown::MarkdownFormatter::new(doc, title, prefix)),
        }
    }
}
