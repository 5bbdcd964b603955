//! HTML formatter: standalone pages with index/TOC navigation.

use crate::anchor::slugify;
use crate::document::{Block, Chapter, Document, Section, Target};
use crate::model::{ContentItem, Marker, MarkerTag};
use crate::render::inline::{self, escape};
use crate::render::{FieldPos, Formatter, Links};

const STYLE: &str = "\
body { font-family: Verdana, Geneva, Arial, Helvetica, serif; color: #000000; background: #FFFFFF; }
div.code { background-color: #D6E8FF; margin: 0 0 0 -0.5em; padding: 0.3ex 0 0.3ex 0.5em; }
div.indent1 { width: 87%; margin: auto; }
div.indent2 { width: 75%; margin: auto; }
h1 { text-align: center; }
h3 { font-size: medium; }
h4 { background-color: #EEEEFF; font-size: medium; font-style: oblique; font-weight: bold; margin: 0 0 0 -0.5em; padding: 0.3ex 0 0.3ex 0.5em; }
p { text-align: justify; }
pre.colored { color: blue; }
span.keyword { font-family: monospace; white-space: pre; color: darkblue; }
table.index-toc-link { width: 100%; }
table.index-toc-link td { padding: 0 0.5em; font-size: 83%; }
table.synopsis { margin: auto; border: 0; border-spacing: 1em 1ex; }
td.left { text-align: left; }
td.right { text-align: right; }
ul.empty { list-style-type: none; }
";

/// Field names longer than this get a row of their own.
const LONG_FIELD_NAME: usize = 22;

/// Width budget for the section synopsis table, in characters.
const SYNOPSIS_WIDTH: usize = 70;

pub struct HtmlFormatter<'a> {
    links: Links<'a>,
    title: String,
}

impl<'a> HtmlFormatter<'a> {
    pub fn new(doc: &'a Document, title: &str, prefix: &str) -> Self {
        Self {
            links: Links::new(doc, prefix, "html"),
            title: title.to_string(),
        }
    }

    fn page_header(&self, out: &mut String) {
        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        out.push_str("<meta charset=\"utf-8\">\n");
        out.push_str(&format!("<title>{} API Reference</title>\n", escape(&self.title)));
        out.push_str("<style>\n");
        out.push_str(STYLE);
        out.push_str("</style>\n");
        out.push_str("</head>\n<body>\n");
    }

    fn page_footer(&self, out: &mut String) {
        out.push_str("</body>\n</html>\n");
    }

    fn api_heading(&self, out: &mut String) {
        out.push_str(&format!("<h1>{} API Reference</h1>\n", escape(&self.title)));
    }

    /// `[Index]` and `[TOC]` navigation row.
    fn nav(&self, out: &mut String, index: bool, toc: bool) {
        out.push_str("<table class=\"index-toc-link\"><tr>");
        if index {
            out.push_str(&format!(
                "<td class=\"left\">[<a href=\"{}\">Index</a>]</td>",
                self.links.index_file()
            ));
        }
        if toc {
            out.push_str(&format!(
                "<td class=\"right\">[<a href=\"{}\">TOC</a>]</td>",
                self.links.toc_file()
            ));
        }
        out.push_str("</tr></table>\n");
    }

    fn word(&self, word: &str) -> String {
        if let Some(xref) = inline::crossref(word) {
            return inline::link_crossref(&self.links, &xref);
        }
        inline::emphasis(word).unwrap_or_else(|| escape(word))
    }

    fn para(&self, words: &[String]) -> String {
        let line: Vec<String> = words.iter().map(|w| self.word(w)).collect();
        let line = inline::link_urls_html(&line.join(" "));
        let line = inline::curly_backtick_quotes(&line);
        format!("<p>{}</p>", inline::nbsp(&line))
    }

    fn code(&self, lines: &[String]) -> String {
        let mut out = String::from("<pre class=\"colored\">\n");
        for line in lines {
            out.push_str(&escape(line));
            out.push('\n');
        }
        out.push_str("</pre>");
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
        parts.join("\n")
    }

    fn synopsis(&self, out: &mut String, section: &Section) {
        let names: Vec<&str> = self
            .links
            .doc()
            .section_blocks(section)
            .map(|b| b.name.as_str())
            .collect();
        let Some(widest) = names.iter().map(|n| n.len()).max() else {
            return;
        };

        let columns = (SYNOPSIS_WIDTH / widest.max(1)).max(1);
        let rows = names.len().div_ceil(columns);
        out.push_str("<table class=\"synopsis\">\n");
        for r in 0..rows {
            out.push_str("<tr>");
            for c in 0..columns {
                out.push_str("<td></td><td>");
                if let Some(name) = names.get(r + c * rows) {
                    out.push_str(&format!(
                        "<a href=\"#{}\">{}</a>",
                        slugify(name),
                        escape(name)
                    ));
                }
                out.push_str("</td>");
            }
            out.push_str("</tr>\n");
        }
        out.push_str("</table><br><br>\n");
    }
}

impl Formatter for HtmlFormatter<'_> {
    fn links(&self) -> &Links<'_> {
        &self.links
    }

    fn toc_enter(&self, out: &mut String) {
        self.page_header(out);
        self.nav(out, true, false);
        self.api_heading(out);
        out.push_str("<h1>Table of Contents</h1>\n");
    }

    fn toc_chapter_enter(&self, out: &mut String, chapter: &Chapter) {
        out.push_str(&format!(
            "<br><div class=\"indent2\"><h2>{}</h2><ul class=\"empty\"><li>\n",
            escape(&chapter.title)
        ));
        out.push_str("<table cellpadding=\"5\">\n");
    }

    fn toc_section_enter(&self, out: &mut String, section: &Section) {
        out.push_str("<tr valign=\"top\"><td class=\"left\">\n");
        out.push_str(&format!(
            "<a href=\"{}\">{}</a></td><td>\n",
            self.links.section_file(section),
            escape(&section.title)
        ));
        out.push_str(&self.para(&section.abstract_words));
        out.push('\n');
    }

    fn toc_section_exit(&self, out: &mut String, _section: &Section) {
        out.push_str("</td></tr>\n");
    }

    fn toc_chapter_exit(&self, out: &mut String, _chapter: &Chapter) {
        out.push_str("</table>\n</li></ul></div>\n");
    }

    fn toc_index(&self, out: &mut String) {
        out.push_str(&format!(
            "<br><div class=\"indent2\"><h2><a href=\"{}\">Global Index</a></h2><ul class=\"empty\"><li></li></ul></div>\n",
            self.links.index_file()
        ));
    }

    fn toc_exit(&self, out: &mut String) {
        out.push_str("<hr>\n");
        self.nav(out, true, false);
        self.page_footer(out);
    }

    fn index_enter(&self, out: &mut String) {
        self.page_header(out);
        self.nav(out, false, true);
        self.api_heading(out);
        out.push_str("<h1>Global Index</h1>\n");
    }

    fn index_name(&self, out: &mut String, name: &str, previous: Option<&str>, target: Target) {
        let letter = initial(name);
        if previous.map(initial) != Some(letter) {
            if previous.is_some() {
                out.push_str("</ul>\n");
            }
            out.push_str(&format!("<h3>{}</h3>\n<ul class=\"empty\">\n", escape(&letter.to_string())));
        }
        // `foo[bar]` is listed as `foo (bar)`
        let display = name.replace('[', " (").replace(']', ")");
        out.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            self.links.target_url(name, target),
            escape(&display)
        ));
    }

    fn index_exit(&self, out: &mut String) {
        if !self.links.doc().index.names().is_empty() {
            out.push_str("</ul>\n");
        }
        out.push_str("<hr>\n");
        self.nav(out, false, true);
        self.page_footer(out);
    }

    fn section_enter(&self, out: &mut String, section: &Section) {
        self.page_header(out);
        self.nav(out, true, true);
        self.api_heading(out);
        out.push_str(&format!("<h1>{}</h1>\n", escape(&section.title)));
        self.synopsis(out, section);
        out.push_str("<div class=\"indent1\">\n");
        out.push_str(&self.items(&section.description));
        out.push_str("\n</div><br>\n");
    }

    fn block_enter(&self, out: &mut String, block: &Block) {
        out.push_str("<div class=\"indent2\">\n");
        out.push_str(&format!(
            "<h3 id=\"{}\">{}</h3>\n",
            slugify(&block.name),
            escape(&block.name)
        ));

        if block.code.is_empty() {
            return;
        }
        if let Some(header) = &block.header {
            out.push_str("<div class=\"indent1\">\n");
            out.push_str(&format!(
                "Defined in {} ({}).\n",
                escape(&header.macro_name),
                escape(&header.path)
            ));
            out.push_str("</div><br>\n");
        }
        out.push_str("<div class=\"indent1\"><div class=\"code\"><pre>\n");
        for line in &block.code {
            out.push_str(&inline::source_line(&self.links, line, &block.name));
            out.push('\n');
        }
        out.push_str("</pre></div></div>\n");
    }

    fn markup_enter(&self, out: &mut String, marker: &Marker, _block: &Block) {
        if marker.tag == MarkerTag::Description {
            out.push_str("<div class=\"indent1\">\n");
        } else {
            out.push_str(&format!("<div class=\"indent1\"><h4>{}</h4>\n", escape(marker.tag.as_str())));
        }
    }

    fn field_enter(&self, out: &mut String, pos: FieldPos<'_>) {
        let field = pos.field();
        let Some(name) = &field.name else {
            out.push_str(&self.items(&field.items));
            out.push('\n');
            return;
        };

        if pos.starts_table() {
            out.push_str("<p></p>\n<table cellpadding=\"3\" border=\"0\">\n");
        }
        let id = if pos.marker.tag == MarkerTag::Values {
            format!(" id=\"{}\"", slugify(name))
        } else {
            String::new()
        };
        if name.len() > LONG_FIELD_NAME {
            out.push_str(&format!(
                "<tr valign=\"top\"><td colspan=\"0\"{}><b>{}</b></td></tr>\n",
                id,
                escape(name)
            ));
            out.push_str("<tr valign=\"top\"><td></td><td>\n");
        } else {
            out.push_str(&format!(
                "<tr valign=\"top\"><td{}><b>{}</b></td><td>\n",
                id,
                escape(name)
            ));
        }
        out.push_str(&self.items(&field.items));
        out.push('\n');
    }

    fn field_exit(&self, out: &mut String, pos: FieldPos<'_>) {
        if !pos.field().is_named() {
            return;
        }
        out.push_str("</td></tr>\n");
        if pos.ends_table() {
            out.push_str("</table>\n");
        }
    }

    fn markup_exit(&self, out: &mut String, marker: &Marker, _block: &Block) {
        if marker.tag == MarkerTag::Description {
            out.push_str("</div><br>\n");
        } else {
            out.push_str("</div>\n");
        }
    }

    fn block_exit(&self, out: &mut String, _block: &Block) {
        out.push_str("<hr>\n");
        self.nav(out, true, true);
        out.push_str("</div>\n");
    }

    fn section_exit(&self, out: &mut String, _section: &Section) {
        self.page_footer(out);
    }
}

/// Index letter heading for a name.
fn initial(name: &str) -> char {
    name.chars().next().map_or(' ', |c| c.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SourceProcessor;
    use crate::render::{index_dump, section_dump, toc_dump};
    use crate::testlog;
    use std::path::Path;

    const INPUT: &str = "\
/*****
 * <Section>
 *   glyph_slots
 * <Title>
 *   Glyph Slots
 * <Abstract>
 *   Where glyphs are _loaded_.
 * <Description>
 *   See @FT_GlyphSlot and `slots'.
 */

/*****
 * <Type>
 *   FT_GlyphSlot
 * <Description>
 *   A handle, see @FT_Nowhere.
 * <Values>
 *   FT_GLYPH_FORMAT_NONE_BUT_VERY_LONG_NAME ::
 *     Nothing.
 *   FT_GLYPH_FORMAT_BITMAP ::
 *     A *bitmap*.
 *     {
 *       x < 1;
 *     }
 */
typedef struct FT_GlyphSlotRec_* FT_GlyphSlot;

/*****
 * <Chapter>
 *   core_api
 * <Title>
 *   Core API
 * <Sections>
 *   glyph_slots
 */
";

    fn document() -> Document {
        let mut processor = SourceProcessor::new();
        processor.parse_file(Path::new("include/freetype/freetype.h"), INPUT);
        processor.finish()
    }

    #[test]
    fn toc_page() {
        let doc = document();
        let f = HtmlFormatter::new(&doc, "FreeType", "ft2");
        let page = toc_dump(&f);
        assert_eq!(page.file_name, "ft2-toc.html");
        assert!(page.content.starts_with("<!DOCTYPE html>"));
        assert!(page.content.contains("<title>FreeType API Reference</title>"));
        assert!(page.content.contains("<h2>Core API</h2>"));
        assert!(page.content.contains("<a href=\"ft2-glyph_slots.html\">Glyph Slots</a>"));
        assert!(page.content.contains("<p>Where glyphs are <i>loaded</i>.</p>"));
        assert!(page.content.contains("<a href=\"ft2-index.html\">Global Index</a>"));
        assert!(page.content.ends_with("</html>\n"));
    }

    #[test]
    fn index_page_groups_by_letter() {
        let doc = document();
        let f = HtmlFormatter::new(&doc, "FreeType", "");
        let page = index_dump(&f);
        assert_eq!(page.file_name, "index.html");
        assert_eq!(page.content.matches("<h3>F</h3>").count(), 1);
        assert!(page
            .content
            .contains("<li><a href=\"glyph_slots.html#ft_glyphslot\">FT_GlyphSlot</a></li>"));
        assert!(page.content.contains(
            "<li><a href=\"glyph_slots.html#ft_glyph_format_bitmap\">FT_GLYPH_FORMAT_BITMAP</a></li>"
        ));
    }

    #[test]
    fn section_page() {
        let doc = document();
        let f = HtmlFormatter::new(&doc, "FreeType", "");
        let section = doc.section_named("glyph_slots").unwrap();
        let (page, logs) = testlog::capture(|| section_dump(&f, section));
        let html = &page.content;

        assert_eq!(page.file_name, "glyph_slots.html");
        assert!(html.contains("<h1>Glyph Slots</h1>"));
        assert!(html.contains("<a href=\"#ft_glyphslot\">FT_GlyphSlot</a>"));
        assert!(html.contains(
            "<p>See <a href=\"glyph_slots.html#ft_glyphslot\">FT_GlyphSlot</a> and &lsquo;slots&rsquo;.</p>"
        ));
        assert!(html.contains("<h3 id=\"ft_glyphslot\">FT_GlyphSlot</h3>"));
        assert!(html.contains(
            "<span class=\"keyword\">typedef</span> <span class=\"keyword\">struct</span> \
             FT_GlyphSlotRec_* <b>FT_GlyphSlot</b>;"
        ));
        assert!(html.contains("<p>A handle, see ?FT_Nowhere?.</p>"));
        assert!(html.contains("<h4>values</h4>"));
        assert!(!html.contains("<h4>type</h4>"));
        assert!(!html.contains("<h4>description</h4>"));
        assert!(html.contains(
            "<tr valign=\"top\"><td colspan=\"0\" id=\"ft_glyph_format_none_but_very_long_name\">\
             <b>FT_GLYPH_FORMAT_NONE_BUT_VERY_LONG_NAME</b></td></tr>"
        ));
        assert!(html.contains(
            "<tr valign=\"top\"><td id=\"ft_glyph_format_bitmap\"><b>FT_GLYPH_FORMAT_BITMAP</b></td><td>"
        ));
        assert!(html.contains("<p>A <b>bitmap</b>.</p>"));
        assert!(html.contains("<pre class=\"colored\">\n  x &lt; 1;\n</pre>"));
        assert_eq!(html.matches("<table cellpadding=\"3\" border=\"0\">").count(), 1);

        let warnings = testlog::warnings(&logs);
        assert_eq!(warnings, ["undefined cross reference 'FT_Nowhere'"]);
    }

    #[test]
    fn header_location() {
        let mut processor = SourceProcessor::new();
        processor.parse_file(
            Path::new("include/freetype/config/ftheader.h"),
            "/*****\n * <Macro>\n *   FT_FREETYPE_H\n */\n#define FT_FREETYPE_H  <freetype/freetype.h>\n",
        );
        processor.parse_file(Path::new("include/freetype/freetype.h"), INPUT);
        let doc = processor.finish();
        let f = HtmlFormatter::new(&doc, "FreeType", "");
        let (page, _) = testlog::capture(|| section_dump(&f, doc.section_named("glyph_slots").unwrap()));
        assert!(page
            .content
            .contains("Defined in FT_FREETYPE_H (freetype/freetype.h)."));
    }
}
