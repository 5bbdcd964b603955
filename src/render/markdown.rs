//! Markdown formatter: one `.md` page per section, with field tables as
//! inline HTML whose cells are rendered from Markdown.

use crate::anchor::slugify;
use crate::document::{Block, Chapter, Document, Section, Target};
use crate::model::{ContentItem, Field, Marker, MarkerTag};
use crate::render::inline::{self, escape};
use crate::render::{FieldPos, Formatter, Links};
use pulldown_cmark::{html, Parser};

const LINE_SEP: &str = "\n-------------------------------\n\n";

/// Field tables switch to the wide layout past this name length.
const LONG_FIELD_NAME: usize = 25;

pub struct MarkdownFormatter<'a> {
    links: Links<'a>,
    title: String,
}

impl<'a> MarkdownFormatter<'a> {
    pub fn new(doc: &'a Document, title: &str, prefix: &str) -> Self {
        Self {
            links: Links::new(doc, prefix, "md"),
            title: title.to_string(),
        }
    }

    /// Breadcrumb line back to the table of contents.
    fn crumbs(&self, out: &mut String, trail: &str) {
        out.push_str(&format!(
            "[{} API Reference]({}) &raquo; {}\n",
            self.title,
            self.links.toc_file(),
            trail
        ));
        out.push_str(LINE_SEP);
    }

    fn word(&self, word: &str) -> String {
        if let Some(xref) = inline::crossref(word) {
            return inline::link_crossref(&self.links, &xref);
        }
        // inline code spans are left to the Markdown renderer
        if word.contains('`') {
            word.to_string()
        } else {
            escape(word)
        }
    }

    fn para(&self, words: &[String]) -> String {
        let line: Vec<String> = words.iter().map(|w| self.word(w)).collect();
        let line = inline::link_urls_markdown(&line.join(" "));
        let line = inline::curly_single_quotes(&line);
        inline::nbsp(&line)
    }

    fn code(&self, lines: &[String]) -> String {
        let mut out = String::from("```\n");
        for line in lines {
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out.push_str("```");
        out
    }

    fn items(&self, items: &[ContentItem]) -> String {
        let parts: Vec<String> = items
            .iter()
            .map(|item| match item {
                ContentItem::Paragraph { words } => self.para(words),
                ContentItem::Code { lines } => self.code(lines),
            })
            .collect();
        parts.join("\n\n")
    }

    /// Items rendered to HTML for use inside a table cell.
    fn cell(&self, items: &[ContentItem]) -> String {
        let markdown = self.items(items);
        let mut out = String::new();
        html::push_html(&mut out, Parser::new(&markdown));
        out.trim_end().to_string()
    }
}

impl Formatter for MarkdownFormatter<'_> {
    fn links(&self) -> &Links<'_> {
        &self.links
    }

    fn toc_enter(&self, out: &mut String) {
        self.crumbs(out, "Table of Contents");
        out.push_str(&format!("# {} API Reference\n\n", self.title));
        out.push_str("# Table of Contents\n\n");
    }

    fn toc_chapter_enter(&self, out: &mut String, chapter: &Chapter) {
        out.push_str(&format!("## {}\n\n", chapter.title));
        out.push_str("<table class=\"toc\">\n");
    }

    fn toc_section_enter(&self, out: &mut String, section: &Section) {
        out.push_str(&format!(
            "<tr><td class=\"link\"><a href=\"{}\">{}</a></td><td class=\"desc\">\n",
            self.links.section_file(section),
            escape(&section.title)
        ));
        let abstract_items = [ContentItem::Paragraph {
            words: section.abstract_words.clone(),
        }];
        out.push_str(&self.cell(&abstract_items));
        out.push('\n');
    }

    fn toc_section_exit(&self, out: &mut String, _section: &Section) {
        out.push_str("</td></tr>\n");
    }

    fn toc_chapter_exit(&self, out: &mut String, _chapter: &Chapter) {
        out.push_str("</table>\n\n");
    }

    fn toc_index(&self, out: &mut String) {
        out.push_str(&format!("## [Global Index]({})\n", self.links.index_file()));
    }

    fn index_enter(&self, out: &mut String) {
        self.crumbs(out, "Global Index");
        out.push_str(&format!("# {} API Reference\n", self.title));
    }

    fn index_name(&self, out: &mut String, name: &str, previous: Option<&str>, target: Target) {
        let letter = initial(name);
        if previous.map(initial) != Some(letter) {
            out.push_str(&format!("\n### {}\n\n", letter));
        }
        // `foo[bar]` is listed as `foo (bar)`
        let display = name.replace('[', " (").replace(']', ")");
        let url = self.links.target_url(name, target).replace('[', "(").replace(']', ")");
        out.push_str(&format!("[{}]({})  \n", display, url));
    }

    fn section_enter(&self, out: &mut String, section: &Section) {
        let doc = self.links.doc();
        let trail = match section.chapter {
            Some(id) => {
                let chapter = doc.chapter(id);
                format!(
                    "[{}]({}#{}) &raquo; {}",
                    chapter.title,
                    self.links.toc_file(),
                    slugify(&chapter.title),
                    section.title
                )
            }
            None => section.title.clone(),
        };
        self.crumbs(out, &trail);

        out.push_str(&format!("# {}\n\n", section.title));
        out.push_str("## Synopsis\n\n");
        if !section.description.is_empty() {
            out.push_str(&self.items(&section.description));
            out.push_str("\n\n");
        }
    }

    fn block_enter(&self, out: &mut String, block: &Block) {
        let display = block.name.split('[').next().unwrap_or(&block.name);
        out.push_str(&format!("## {}\n\n", display));

        if block.code.is_empty() {
            return;
        }
        if let Some(header) = &block.header {
            out.push_str(&format!("Defined in {} ({}).\n\n", header.macro_name, header.path));
        }
        out.push_str("<div class=\"codehilite\">\n<pre>\n");
        for line in &block.code {
            out.push_str(&inline::source_line(&self.links, line, &block.name));
            out.push('\n');
        }
        out.push_str("</pre>\n</div>\n\n");
    }

    fn markup_enter(&self, out: &mut String, marker: &Marker, _block: &Block) {
        if marker.tag != MarkerTag::Description {
            out.push_str(&format!("<h4>{}</h4>\n\n", marker.tag));
        }
    }

    fn field_enter(&self, out: &mut String, pos: FieldPos<'_>) {
        let field = pos.field();
        let Some(name) = &field.name else {
            out.push_str(&self.items(&field.items));
            out.push_str("\n\n");
            return;
        };

        if pos.starts_table() {
            if is_long_table(pos.table_group()) {
                out.push_str("<table class=\"fields long\">\n");
            } else {
                out.push_str("<table class=\"fields\">\n");
            }
        }
        out.push_str(&format!(
            "<tr><td class=\"val\" id=\"{}\">{}</td><td class=\"desc\">\n",
            slugify(name),
            escape(name)
        ));
        out.push_str(&self.cell(&field.items));
        out.push('\n');
    }

    fn field_exit(&self, out: &mut String, pos: FieldPos<'_>) {
        if !pos.field().is_named() {
            return;
        }
        out.push_str("</td></tr>\n");
        if pos.ends_table() {
            out.push_str("</table>\n\n");
        }
    }

    fn block_exit(&self, out: &mut String, _block: &Block) {
        out.push_str("<hr>\n\n");
    }
}

/// A table with long names or code snippets uses the wide layout.
fn is_long_table(fields: &[Field]) -> bool {
    fields.iter().any(|f| {
        f.name.as_ref().is_some_and(|n| n.len() > LONG_FIELD_NAME)
            || f.items.iter().any(|i| matches!(i, ContentItem::Code { .. }))
    })
}

fn initial(name: &str) -> char {
    name.chars().next().map_or(' ', |c| c.to_ascii_uppercase())
}
