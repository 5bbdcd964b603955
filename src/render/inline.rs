//! Inline text rules shared by the formatters.

use crate::document::Target;
use crate::render::Links;
use log::warn;
use regex::{Captures, Regex};
use std::sync::LazyLock;

// @FT_Open_Face, @FT_LOAD_TARGET_XXX[mono]:
static RE_CROSSREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([\w-]+(?:\[[\w-]+\])?)(.*)$").unwrap());

static RE_SUBSCRIPT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[.*\]").unwrap());

static RE_ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^_(\w+(?:'\w+)*)_(.*)$").unwrap());

static RE_BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*(\w+(?:'\w+)*)\*(.*)$").unwrap());

static RE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"((?:https?|ftp)://[^\s'"<>]*[\w/])"#).unwrap());

// `quoted' in HTML output, 'quoted' in Markdown output
static RE_BACKTICK_QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\W)`(.*?)'(\W|$)").unwrap());

static RE_SINGLE_QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\W)'(.*?)'(\W|$)").unwrap());

static RE_SOURCE_IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#?[A-Za-z_]\w*").unwrap());

const KEYWORDS: &[&str] = &[
    "typedef", "struct", "enum", "union", "const", "char", "int", "short", "long", "void",
    "signed", "unsigned", "#include", "#define", "#undef", "#if", "#ifdef", "#ifndef", "#else",
    "#endif",
];

/// A `@name` reference word with the text glued after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossRef<'a> {
    pub name: &'a str,
    pub rest: &'a str,
}

impl CrossRef<'_> {
    /// `foo[bar]` is shown as `foo`.
    pub fn display_name(&self) -> String {
        RE_SUBSCRIPT.replace(self.name, "").into_owned()
    }
}

pub fn crossref(word: &str) -> Option<CrossRef<'_>> {
    let caps = RE_CROSSREF.captures(word)?;
    Some(CrossRef {
        name: caps.get(1)?.as_str(),
        rest: caps.get(2)?.as_str(),
    })
}

/// Render a reference word as a link, or as `?name?rest` with a warning
/// when the name is unknown.
pub fn link_crossref(links: &Links<'_>, xref: &CrossRef<'_>) -> String {
    let doc = links.doc();
    let Some(target) = doc.lookup(xref.name) else {
        warn!("undefined cross reference '{}'", xref.name);
        return format!("?{}?{}", xref.name, escape(xref.rest));
    };

    let url = links.target_url(xref.name, target);
    match target {
        Target::Section(id) => format!(
            "&lsquo;<a href=\"{}\">{}</a>&rsquo;{}",
            url,
            escape(&doc.section(id).title),
            escape(xref.rest)
        ),
        Target::Block(_) | Target::Value(_) => format!(
            "<a href=\"{}\">{}</a>{}",
            url,
            escape(&xref.display_name()),
            escape(xref.rest)
        ),
    }
}

/// `_word_` and `*word*` emphasis.
pub fn emphasis(word: &str) -> Option<String> {
    if let Some(caps) = RE_ITALIC.captures(word) {
        return Some(format!("<i>{}</i>{}", &caps[1], escape(&caps[2])));
    }
    if let Some(caps) = RE_BOLD.captures(word) {
        return Some(format!("<b>{}</b>{}", &caps[1], escape(&caps[2])));
    }
    None
}

pub fn escape(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

/// Bare URLs as HTML links.
pub fn link_urls_html(line: &str) -> String {
    RE_URL.replace_all(line, r#"<a href="$1">$1</a>"#).into_owned()
}

/// Bare URLs as Markdown autolinks.
pub fn link_urls_markdown(line: &str) -> String {
    RE_URL.replace_all(line, "<$1>").into_owned()
}

pub fn curly_backtick_quotes(line: &str) -> String {
    RE_BACKTICK_QUOTE.replace_all(line, curly).into_owned()
}

pub fn curly_single_quotes(line: &str) -> String {
    RE_SINGLE_QUOTE.replace_all(line, curly).into_owned()
}

fn curly(caps: &Captures<'_>) -> String {
    format!("{}&lsquo;{}&rsquo;{}", &caps[1], &caps[2], &caps[3])
}

pub fn nbsp(line: &str) -> String {
    line.replace('~', "&nbsp;")
}

/// Highlight one source excerpt line: the block's own name in bold, C
/// keywords in a `keyword` span, known identifiers as links; everything
/// else is escaped.
pub fn source_line(links: &Links<'_>, line: &str, block_name: &str) -> String {
    let doc = links.doc();
    let mut out = String::with_capacity(line.len());
    let mut last = 0;

    for m in RE_SOURCE_IDENT.find_iter(line) {
        out.push_str(&escape(&line[last..m.start()]));
        last = m.end();

        let name = m.as_str();
        if name == block_name {
            out.push_str(&format!("<b>{}</b>", name));
        } else if KEYWORDS.contains(&name) {
            out.push_str(&format!("<span class=\"keyword\">{}</span>", name));
        } else {
            match doc.lookup(name) {
                // no links to sections from code
                Some(target @ (Target::Block(_) | Target::Value(_))) => out.push_str(&format!(
                    "<a href=\"{}\">{}</a>",
                    links.target_url(name, target),
                    name
                )),
                _ => out.push_str(&escape(name)),
            }
        }
    }
    out.push_str(&escape(&line[last..]));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::parser::SourceProcessor;
    use crate::testlog;
    use std::path::Path;

    const INPUT: &str = "\
/*****
 * <Section>
 *   base
 * <Title>
 *   Base Interface
 */

/*****
 * <Struct>
 *   FT_Face
 */
typedef struct FT_FaceRec_* FT_Face;

/*****
 * <Enum>
 *   FT_Encoding
 * <Values>
 *   FT_ENCODING_NONE :: None.
 */
";

    fn document() -> Document {
        let mut processor = SourceProcessor::new();
        processor.parse_file(Path::new("freetype.h"), INPUT);
        processor.finish()
    }

    #[test]
    fn crossref_words() {
        assert_eq!(
            crossref("@FT_Face."),
            Some(CrossRef {
                name: "FT_Face",
                rest: ".",
            })
        );
        let xref = crossref("@FT_LOAD_TARGET_XXX[mono]),").unwrap();
        assert_eq!(xref.name, "FT_LOAD_TARGET_XXX[mono]");
        assert_eq!(xref.rest, "),");
        assert_eq!(xref.display_name(), "FT_LOAD_TARGET_XXX");
        assert_eq!(crossref("mail@example"), None);
        assert_eq!(crossref("@"), None);
    }

    #[test]
    fn resolved_links() {
        let doc = document();
        let links = Links::new(&doc, "ft2", "html");
        let (html, logs) = testlog::capture(|| {
            [
                link_crossref(&links, &crossref("@FT_Face,").unwrap()),
                link_crossref(&links, &crossref("@FT_ENCODING_NONE").unwrap()),
                link_crossref(&links, &crossref("@base").unwrap()),
            ]
        });
        assert_eq!(html[0], "<a href=\"ft2-base.html#ft_face\">FT_Face</a>,");
        assert_eq!(html[1], "<a href=\"ft2-base.html#ft_encoding_none\">FT_ENCODING_NONE</a>");
        assert_eq!(html[2], "&lsquo;<a href=\"ft2-base.html\">Base Interface</a>&rsquo;");
        assert!(testlog::warnings(&logs).is_empty());
    }

    #[test]
    fn unresolved_reference_warns_once() {
        let doc = document();
        let links = Links::new(&doc, "", "md");
        let (text, logs) =
            testlog::capture(|| link_crossref(&links, &crossref("@FT_Missing_Thing.").unwrap()));
        assert_eq!(text, "?FT_Missing_Thing?.");
        let warnings = testlog::warnings(&logs);
        assert_eq!(warnings, ["undefined cross reference 'FT_Missing_Thing'"]);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let doc = document();
        let links = Links::new(&doc, "", "md");
        let (text, _) = testlog::capture(|| link_crossref(&links, &crossref("@ft_face").unwrap()));
        assert_eq!(text, "?ft_face?");
    }

    #[test]
    fn emphasis_words() {
        assert_eq!(emphasis("_not_").as_deref(), Some("<i>not</i>"));
        assert_eq!(emphasis("*must*,").as_deref(), Some("<b>must</b>,"));
        assert_eq!(emphasis("_a_b"), Some("<i>a</i>b".to_string()));
        assert_eq!(emphasis("plain"), None);
        assert_eq!(emphasis("*"), None);
    }

    #[test]
    fn paragraph_rewrites() {
        assert_eq!(
            link_urls_html("see https://freetype.org/docs."),
            "see <a href=\"https://freetype.org/docs\">https://freetype.org/docs</a>."
        );
        assert_eq!(link_urls_markdown("at https://freetype.org/"), "at <https://freetype.org/>");
        assert_eq!(curly_backtick_quotes("a `b' c"), "a &lsquo;b&rsquo; c");
        assert_eq!(curly_single_quotes("the 'glyph' slot"), "the &lsquo;glyph&rsquo; slot");
        assert_eq!(nbsp("12~pt"), "12&nbsp;pt");
    }

    #[test]
    fn source_highlighting() {
        let doc = document();
        let links = Links::new(&doc, "", "html");
        assert_eq!(
            source_line(&links, "  typedef struct FT_FaceRec_* FT_Face;", "FT_Face"),
            "  <span class=\"keyword\">typedef</span> <span class=\"keyword\">struct</span> \
             FT_FaceRec_* <b>FT_Face</b>;"
        );
        assert_eq!(
            source_line(&links, "FT_Encoding e = FT_ENCODING_NONE; /* a<b */", "FT_Encoding"),
            "<b>FT_Encoding</b> e = <a href=\"base.html#ft_encoding_none\">FT_ENCODING_NONE</a>; \
             /* a&lt;b */"
        );
        assert_eq!(
            source_line(&links, "#define X( f )  f( FT_Face )", "X"),
            "<span class=\"keyword\">#define</span> <b>X</b>( f )  f( \
             <a href=\"base.html#ft_face\">FT_Face</a> )"
        );
        // section names are not linked from code
        assert_eq!(source_line(&links, "base", "FT_Face"), "base");
    }
}
