//! Content model for parsed documentation comments, format-agnostic.

use std::fmt;
use std::path::PathBuf;

/// Tag of a marker such as `<Description>` or `@values:`.
///
/// Names are matched case-insensitively and stored lowercase, which is also
/// the form used when a marker heading is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MarkerTag {
    Section,
    Chapter,
    Title,
    Abstract,
    Description,
    Order,
    Sections,
    Struct,
    Function,
    FuncType,
    Macro,
    Type,
    Enum,
    Constant,
    Values,
    Fields,
    Input,
    Output,
    InOut,
    Return,
    Note,
    Since,
    Also,
    Example,
    Other(String),
}

impl MarkerTag {
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        match lower.as_str() {
            "section" => Self::Section,
            "chapter" => Self::Chapter,
            "title" => Self::Title,
            "abstract" => Self::Abstract,
            "description" => Self::Description,
            "order" => Self::Order,
            "sections" => Self::Sections,
            "struct" => Self::Struct,
            "function" => Self::Function,
            "functype" => Self::FuncType,
            "macro" => Self::Macro,
            "type" => Self::Type,
            "enum" => Self::Enum,
            "constant" => Self::Constant,
            "values" => Self::Values,
            "fields" => Self::Fields,
            "input" => Self::Input,
            "output" => Self::Output,
            "inout" => Self::InOut,
            "return" => Self::Return,
            "note" => Self::Note,
            "since" => Self::Since,
            "also" => Self::Also,
            "example" => Self::Example,
            _ => Self::Other(lower),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Section => "section",
            Self::Chapter => "chapter",
            Self::Title => "title",
            Self::Abstract => "abstract",
            Self::Description => "description",
            Self::Order => "order",
            Self::Sections => "sections",
            Self::Struct => "struct",
            Self::Function => "function",
            Self::FuncType => "functype",
            Self::Macro => "macro",
            Self::Type => "type",
            Self::Enum => "enum",
            Self::Constant => "constant",
            Self::Values => "values",
            Self::Fields => "fields",
            Self::Input => "input",
            Self::Output => "output",
            Self::InOut => "inout",
            Self::Return => "return",
            Self::Note => "note",
            Self::Since => "since",
            Self::Also => "also",
            Self::Example => "example",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for MarkerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of marker content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentItem {
    /// Words of a prose paragraph, reflowed when rendered.
    Paragraph { words: Vec<String> },
    /// Lines of a code snippet with the snippet margin removed.
    Code { lines: Vec<String> },
}

/// A named (`name :: ...`) or free-standing run of content items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// `None` for free text and code between named fields.
    pub name: Option<String>,
    pub items: Vec<ContentItem>,
}

impl Field {
    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }
}

/// A tagged part of a documentation comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub tag: MarkerTag,
    pub fields: Vec<Field>,
}

impl Marker {
    /// Items of the first field.
    pub fn items(&self) -> &[ContentItem] {
        self.fields
            .first()
            .map(|f| f.items.as_slice())
            .unwrap_or_default()
    }

    /// Words of the first paragraph of the first field.
    pub fn words(&self) -> &[String] {
        match self.items().first() {
            Some(ContentItem::Paragraph { words }) => words,
            _ => &[],
        }
    }

    /// Words of every paragraph in every field, in order.
    pub fn all_words(&self) -> Vec<String> {
        self.fields
            .iter()
            .flat_map(|f| &f.items)
            .filter_map(|item| match item {
                ContentItem::Paragraph { words } => Some(words.iter().cloned()),
                ContentItem::Code { .. } => None,
            })
            .flatten()
            .collect()
    }

    /// First paragraph as a single line of text.
    pub fn text(&self) -> Option<String> {
        let words = self.words();
        if words.is_empty() {
            None
        } else {
            Some(words.join(" "))
        }
    }
}

/// Where a documentation comment starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: PathBuf,
    pub lineno: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.lineno)
    }
}
