//! Content parser: turns a marker's lines into fields of paragraphs and
//! code snippets.
//!
//! ```text
//!   Free text before any field.
//!
//!   name ::
//!     Description of `name`, possibly
//!     spanning several lines.
//!
//!     {
//!       code_sample( name );
//!     }
//! ```

use crate::model::{ContentItem, Field};
use regex::Regex;
use std::sync::LazyLock;

static RE_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*([\w.\-\[\]]+|"[\w.\-]*")\s*::"#).unwrap());

/// Parse marker lines into fields. Unnamed fields hold the text found
/// before or between named ones; the original order is kept.
pub fn parse_fields(lines: &[String]) -> Vec<Field> {
    let mut parser = FieldParser::default();
    for line in lines {
        parser.line(line);
    }
    parser.finish()
}

#[derive(Debug)]
struct Code {
    margin: usize,
    lines: Vec<String>,
}

#[derive(Debug, Default)]
struct FieldParser {
    fields: Vec<Field>,
    name: Option<String>,
    items: Vec<ContentItem>,
    words: Vec<String>,
    code: Option<Code>,
}

impl FieldParser {
    fn line(&mut self, line: &str) {
        if let Some(code) = self.code.as_mut() {
            if is_code_end(line, code.margin) {
                self.end_code();
            } else {
                code.lines.push(strip_margin(line, code.margin).to_string());
            }
            return;
        }

        let trimmed = line.trim();
        if trimmed == "{" {
            self.end_paragraph();
            self.code = Some(Code {
                margin: indent_width(line),
                lines: Vec::new(),
            });
            return;
        }

        if trimmed.is_empty() {
            self.end_paragraph();
            return;
        }

        if let Some((name, rest)) = field_header(line) {
            self.end_paragraph();
            self.end_field();
            self.name = Some(name.to_string());
            self.words.extend(rest.split_whitespace().map(String::from));
            return;
        }

        self.words.extend(line.split_whitespace().map(String::from));
    }

    fn end_paragraph(&mut self) {
        if !self.words.is_empty() {
            let words = std::mem::take(&mut self.words);
            self.items.push(ContentItem::Paragraph { words });
        }
    }

    fn end_code(&mut self) {
        if let Some(code) = self.code.take() {
            self.items.push(ContentItem::Code { lines: code.lines });
        }
    }

    fn end_field(&mut self) {
        if self.name.is_some() || !self.items.is_empty() {
            self.fields.push(Field {
                name: self.name.take(),
                items: std::mem::take(&mut self.items),
            });
        }
    }

    fn finish(mut self) -> Vec<Field> {
        // an unterminated snippet still counts
        self.end_code();
        self.end_paragraph();
        self.end_field();
        self.fields
    }
}

/// Match `name ::` at the start of a line, returning the name and the text
/// after the separator.
fn field_header(line: &str) -> Option<(&str, &str)> {
    let caps = RE_FIELD.captures(line)?;
    let end = caps.get(0)?.end();
    let rest = &line[end..];
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some((caps.get(1)?.as_str(), rest))
}

/// Leading whitespace, counted in characters.
fn indent_width(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Exactly `margin` columns of whitespace followed by a single `}`.
fn is_code_end(line: &str, margin: usize) -> bool {
    line.trim_end().strip_suffix('}').is_some_and(|indent| {
        indent.chars().all(char::is_whitespace) && indent.chars().count() == margin
    })
}

fn strip_margin(line: &str, margin: usize) -> &str {
    if indent_width(line) >= margin {
        let start = line.char_indices().nth(margin).map_or(line.len(), |(i, _)| i);
        &line[start..]
    } else if line.trim_start().is_empty() {
        ""
    } else {
        line
    }
}
