//! Document model: blocks grouped into sections and chapters, plus the
//! identifier index used for cross-references.
//!
//! A `DocumentBuilder` accumulates blocks across all input files;
//! `finish()` resolves sections, chapters, ordering and the index and
//! returns a read-only `Document`.

use crate::anchor;
use crate::model::{ContentItem, Location, Marker, MarkerTag};
use log::{debug, warn};
use regex::Regex;
use std::collections::HashMap;
use std::iter;
use std::sync::LazyLock;

/// Section holding blocks that appear before any `<Section>` block.
pub const DEFAULT_SECTION: &str = "other";

const OTHER_CHAPTER: &str = "other";
const OTHER_CHAPTER_TITLE: &str = "Miscellaneous";
const ERRNAME: &str = "ERRNAME";

// `FT_Foo,` → `FT_Foo`, `FT_LOAD_TARGET_XXX[mono]` kept whole
static RE_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w-]+(?:\[[\w-]+\])?").unwrap());

// #define FT_FREETYPE_H  <freetype/freetype.h>
static RE_HEADER_MACRO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#\s*define\s+(\w+)\s+<([^>]+)>").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChapterId(pub usize);

/// Public header a block is declared in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRef {
    /// e.g. `FT_FREETYPE_H`
    pub macro_name: String,
    /// e.g. `freetype/freetype.h`
    pub path: String,
}

/// One documented entity: a comment's markers plus the code after it.
#[derive(Debug, Clone)]
pub struct Block {
    /// Tag of the heading marker (`struct`, `function`, `section`, ...).
    pub kind: MarkerTag,
    pub name: String,
    heading: Marker,
    body: Vec<Marker>,
    /// Source excerpt, leading and trailing blank lines removed.
    pub code: Vec<String>,
    pub location: Location,
    /// Owning section. `None` only for chapter definitions.
    pub section: Option<SectionId>,
    pub header: Option<HeaderRef>,
}

impl Block {
    /// Markers rendered as block content: everything after the heading.
    pub fn body(&self) -> &[Marker] {
        &self.body
    }

    /// Heading and body markers in declaration order.
    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        iter::once(&self.heading).chain(&self.body)
    }

    pub fn marker(&self, tag: &MarkerTag) -> Option<&Marker> {
        self.markers().find(|m| &m.tag == tag)
    }
}

#[derive(Debug, Clone)]
pub struct Section {
    pub name: String,
    pub title: String,
    pub abstract_words: Vec<String>,
    pub description: Vec<ContentItem>,
    /// Names from the `order` marker.
    pub order: Vec<String>,
    /// Content blocks in rendering order.
    pub blocks: Vec<BlockId>,
    /// `<Section>` blocks defining this section.
    pub defs: Vec<BlockId>,
    pub chapter: Option<ChapterId>,
}

impl Section {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            title: name.to_string(),
            abstract_words: Vec::new(),
            description: Vec::new(),
            order: Vec::new(),
            blocks: Vec::new(),
            defs: Vec::new(),
            chapter: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Chapter {
    pub name: String,
    pub title: String,
    /// Section names from the `sections` marker.
    pub order: Vec<String>,
    pub sections: Vec<SectionId>,
}

/// What an identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Block(BlockId),
    /// A named field of a `values` marker inside the block.
    Value(BlockId),
    Section(SectionId),
}

impl Target {
    pub fn block(self) -> Option<BlockId> {
        match self {
            Target::Block(id) | Target::Value(id) => Some(id),
            Target::Section(_) => None,
        }
    }
}

/// Identifier → target map plus the sorted global index.
///
/// Lookups are case-sensitive; only the index order folds case.
#[derive(Debug, Default)]
pub struct IdentifierIndex {
    targets: HashMap<String, Target>,
    names: Vec<String>,
}

impl IdentifierIndex {
    pub fn get(&self, name: &str) -> Option<Target> {
        self.targets.get(name).copied()
    }

    /// Block and value names in index order. Section names are not listed.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Two definitions sharing one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub name: String,
    pub location: Location,
    /// The first definition, which stays canonical.
    pub previous: Location,
}

/// Finished documentation model. Read-only; formatters only borrow it.
#[derive(Debug)]
pub struct Document {
    pub blocks: Vec<Block>,
    pub sections: Vec<Section>,
    pub chapters: Vec<Chapter>,
    pub index: IdentifierIndex,
    pub conflicts: Vec<Conflict>,
}

impl Document {
    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0]
    }

    pub fn section(&self, id: SectionId) -> &Section {
        &self.sections[id.0]
    }

    pub fn chapter(&self, id: ChapterId) -> &Chapter {
        &self.chapters[id.0]
    }

    pub fn lookup(&self, name: &str) -> Option<Target> {
        self.index.get(name)
    }

    pub fn section_blocks<'a>(&'a self, section: &'a Section) -> impl Iterator<Item = &'a Block> + 'a {
        section.blocks.iter().map(move |&id| self.block(id))
    }
}

#[cfg(test)]
impl Document {
    pub fn block_named(&self, name: &str) -> Option<&Block> {
        match self.lookup(name)? {
            Target::Block(id) => Some(self.block(id)),
            _ => None,
        }
    }

    pub fn section_named(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }
}

/// Accumulates blocks from any number of files.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    blocks: Vec<Block>,
    sections: Vec<Section>,
    section_ids: HashMap<String, SectionId>,
    current: Option<SectionId>,
    chapter_blocks: Vec<BlockId>,
    registry: HashMap<String, BlockId>,
    headers: Vec<HeaderRef>,
    conflicts: Vec<Conflict>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn a comment's markers and source excerpt into a block.
    ///
    /// `<Section>` blocks switch the current section, `<Chapter>` blocks
    /// declare a chapter, anything else joins the current section. A
    /// duplicate name is recorded as a conflict; the first block keeps it.
    pub fn add_block(
        &mut self,
        markers: Vec<Marker>,
        code: Vec<String>,
        location: Location,
    ) -> Option<BlockId> {
        let mut markers = markers.into_iter();
        let heading = markers.next()?;
        let body: Vec<Marker> = markers.collect();
        let kind = heading.tag.clone();

        let name = block_name(&heading).unwrap_or_else(|| {
            warn!("no name for '{}' block in {}", kind, location);
            ERRNAME.to_string()
        });

        self.collect_headers(&code);

        let id = BlockId(self.blocks.len());
        let section = match kind {
            MarkerTag::Section => {
                let sid = self.section_id(&name);
                self.current = Some(sid);
                self.sections[sid.0].defs.push(id);
                Some(sid)
            }
            MarkerTag::Chapter => {
                self.chapter_blocks.push(id);
                None
            }
            _ => {
                let sid = self.current_section();
                self.sections[sid.0].blocks.push(id);
                self.register(&name, id, &location);
                Some(sid)
            }
        };

        debug!("{}: {} '{}'", location, kind, name);
        self.blocks.push(Block {
            kind,
            name,
            heading,
            body,
            code,
            location,
            section,
            header: None,
        });
        Some(id)
    }

    /// Resolve sections, chapters, ordering, headers and the index.
    pub fn finish(mut self) -> Document {
        self.describe_sections();
        let chapters = self.build_chapters();
        self.reorder_sections();
        self.resolve_headers();
        let index = self.build_index();

        Document {
            blocks: self.blocks,
            sections: self.sections,
            chapters,
            index,
            conflicts: self.conflicts,
        }
    }

    fn section_id(&mut self, name: &str) -> SectionId {
        if let Some(&id) = self.section_ids.get(name) {
            return id;
        }
        let id = SectionId(self.sections.len());
        self.sections.push(Section::new(name));
        self.section_ids.insert(name.to_string(), id);
        id
    }

    fn current_section(&mut self) -> SectionId {
        if let Some(id) = self.current {
            return id;
        }
        let id = self.section_id(DEFAULT_SECTION);
        self.current = Some(id);
        id
    }

    fn register(&mut self, name: &str, id: BlockId, location: &Location) {
        match self.registry.get(name) {
            Some(&first) => {
                let previous = self.blocks[first.0].location.clone();
                warn!(
                    "duplicate definition for '{}' in {}, previous definition in {}",
                    name, location, previous
                );
                self.conflicts.push(Conflict {
                    name: name.to_string(),
                    location: location.clone(),
                    previous,
                });
            }
            None => {
                self.registry.insert(name.to_string(), id);
            }
        }
    }

    fn collect_headers(&mut self, code: &[String]) {
        for line in code {
            let Some(caps) = RE_HEADER_MACRO.captures(line) else {
                continue;
            };
            let path = caps[2].trim().to_string();
            if self.headers.iter().all(|h| h.path != path) {
                self.headers.push(HeaderRef {
                    macro_name: caps[1].to_string(),
                    path,
                });
            }
        }
    }

    /// Each section takes its title, abstract, description and order from
    /// the first definition block that has a title.
    fn describe_sections(&mut self) {
        for section in &mut self.sections {
            let def = section
                .defs
                .iter()
                .map(|id| &self.blocks[id.0])
                .find(|b| b.marker(&MarkerTag::Title).and_then(Marker::text).is_some());
            let Some(def) = def else {
                continue;
            };

            if let Some(title) = def.marker(&MarkerTag::Title).and_then(Marker::text) {
                section.title = title;
            }
            section.abstract_words = def
                .marker(&MarkerTag::Abstract)
                .map(|m| m.words().to_vec())
                .unwrap_or_default();
            section.description = def
                .marker(&MarkerTag::Description)
                .map(|m| m.items().to_vec())
                .unwrap_or_default();
            section.order = def
                .marker(&MarkerTag::Order)
                .map(Marker::all_words)
                .unwrap_or_default();
        }
    }

    fn build_chapters(&mut self) -> Vec<Chapter> {
        let mut chapters = Vec::new();

        for &bid in &self.chapter_blocks {
            let block = &self.blocks[bid.0];
            let id = ChapterId(chapters.len());
            let mut chapter = Chapter {
                name: block.name.clone(),
                title: block
                    .marker(&MarkerTag::Title)
                    .and_then(Marker::text)
                    .unwrap_or_else(|| block.name.clone()),
                order: block
                    .marker(&MarkerTag::Sections)
                    .map(Marker::all_words)
                    .unwrap_or_default(),
                sections: Vec::new(),
            };

            for name in &chapter.order {
                match self.section_ids.get(name) {
                    Some(&sid) => {
                        self.sections[sid.0].chapter = Some(id);
                        chapter.sections.push(sid);
                    }
                    None => warn!(
                        "chapter '{}' in {} lists unknown section '{}'",
                        chapter.name, block.location, name
                    ),
                }
            }
            chapters.push(chapter);
        }

        let others: Vec<SectionId> = (0..self.sections.len())
            .map(SectionId)
            .filter(|sid| self.sections[sid.0].chapter.is_none())
            .collect();
        if !others.is_empty() {
            let id = ChapterId(chapters.len());
            for sid in &others {
                self.sections[sid.0].chapter = Some(id);
            }
            chapters.push(Chapter {
                name: OTHER_CHAPTER.to_string(),
                title: OTHER_CHAPTER_TITLE.to_string(),
                order: Vec::new(),
                sections: others,
            });
        }

        chapters
    }

    /// Names listed in a section's `order` come first, the rest keep their
    /// declaration order.
    fn reorder_sections(&mut self) {
        for section in &mut self.sections {
            if section.order.is_empty() {
                continue;
            }
            let mut rest = std::mem::take(&mut section.blocks);
            let mut ordered = Vec::with_capacity(rest.len());
            for name in &section.order {
                match rest.iter().position(|id| self.blocks[id.0].name == *name) {
                    Some(pos) => ordered.push(rest.remove(pos)),
                    None => debug!("section '{}' orders unknown block '{}'", section.name, name),
                }
            }
            ordered.extend(rest);
            section.blocks = ordered;
        }
    }

    fn resolve_headers(&mut self) {
        for block in &mut self.blocks {
            block.header = self
                .headers
                .iter()
                .find(|h| block.location.path.ends_with(&h.path))
                .cloned();
        }
    }

    fn build_index(&mut self) -> IdentifierIndex {
        let mut targets: HashMap<String, Target> = self
            .registry
            .iter()
            .map(|(name, &id)| (name.clone(), Target::Block(id)))
            .collect();

        for (i, block) in self.blocks.iter().enumerate() {
            if matches!(block.kind, MarkerTag::Section | MarkerTag::Chapter) {
                continue;
            }
            let values = block.markers().filter(|m| m.tag == MarkerTag::Values);
            for name in values.flat_map(|m| &m.fields).filter_map(|f| f.name.as_deref()) {
                match targets.get(name).and_then(|t| t.block()) {
                    Some(first) => {
                        let previous = self.blocks[first.0].location.clone();
                        warn!(
                            "duplicate definition for '{}' in {}, previous definition in {}",
                            name, block.location, previous
                        );
                        self.conflicts.push(Conflict {
                            name: name.to_string(),
                            location: block.location.clone(),
                            previous,
                        });
                    }
                    None => {
                        targets.insert(name.to_string(), Target::Value(BlockId(i)));
                    }
                }
            }
        }

        let mut names: Vec<String> = targets.keys().cloned().collect();
        anchor::sort_index(&mut names);

        // resolvable, but not listed in the global index
        for (i, section) in self.sections.iter().enumerate() {
            targets
                .entry(section.name.clone())
                .or_insert(Target::Section(SectionId(i)));
        }

        IdentifierIndex { targets, names }
    }
}

/// Identifier at the start of the heading marker's first paragraph.
fn block_name(heading: &Marker) -> Option<String> {
    let word = heading.words().first()?;
    let name = RE_IDENTIFIER
        .find(word)
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(word);
    Some(name.to_string())
}
