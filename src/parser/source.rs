//! Line classifier: finds documentation comments and their source excerpts.
//!
//! Two comment layouts are recognized:
//!
//! ```text
//! /**************************     /************************/
//!  *                              /*                      */
//!  * <Struct>                     /* <Struct>             */
//!  *   FT_Foo                     /*   FT_Foo             */
//!  *                              /*                      */
//!  */                             /************************/
//! ```
//!
//! The lines following a comment, up to the next comment opening, form its
//! source excerpt. Comments whose text starts with `@` or `#` do not end an
//! excerpt.

use log::debug;

const OPEN: &str = "/*";
const CLOSE: &str = "*/";
const FILLER: char = '*';
const CONTINUATION_SIGILS: [char; 2] = ['@', '#'];

/// One input line with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub lineno: usize,
    pub text: String,
}

impl SourceLine {
    pub fn new(lineno: usize, text: impl Into<String>) -> Self {
        Self {
            lineno,
            text: text.into(),
        }
    }

    /// Width of the leading whitespace.
    pub fn margin(&self) -> usize {
        self.text.len() - self.text.trim_start().len()
    }

    /// The line with its margin stripped.
    pub fn content(&self) -> &str {
        &self.text[self.margin()..]
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Comment body lines (framing removed) plus the source lines after it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommentBlock {
    /// Line number of the comment opening.
    pub lineno: usize,
    pub lines: Vec<String>,
    pub code: Vec<SourceLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    WaitComment,
    /// `/****` opening, ` * text` body, ` */` closing.
    InBlockA,
    /// `/****/` opening and closing, `/* text */` body. `width` is the
    /// filler width of the opening divider.
    InBlockB { width: usize },
    WaitSource,
    InSource,
}

/// Streaming line classifier. Feed lines in order, then call `finish`.
#[derive(Debug)]
pub struct Classifier {
    state: State,
    current: CommentBlock,
    blocks: Vec<CommentBlock>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier {
    pub fn new() -> Self {
        Self {
            state: State::WaitComment,
            current: CommentBlock::default(),
            blocks: Vec::new(),
        }
    }

    pub fn feed(&mut self, line: SourceLine) {
        match self.state {
            State::WaitComment => self.wait_comment(line),
            State::InBlockA => self.in_block_a(line),
            State::InBlockB { width } => self.in_block_b(line, width),
            State::WaitSource | State::InSource => self.in_source(line),
        }
    }

    /// Flush the pending comment and return every block found.
    pub fn finish(mut self) -> Vec<CommentBlock> {
        match self.state {
            State::WaitSource | State::InSource => self.flush(),
            State::InBlockB { .. } => {
                self.end_comment();
                if self.state == State::WaitSource {
                    self.flush();
                }
            }
            State::InBlockA => {
                debug!(
                    "line {}: comment not closed before end of input",
                    self.current.lineno
                );
            }
            State::WaitComment => {}
        }
        self.blocks
    }

    fn wait_comment(&mut self, line: SourceLine) {
        let content = line.content();
        let state = if opens_block_a(content) {
            State::InBlockA
        } else if let Some(width) = opens_block_b(content) {
            State::InBlockB { width }
        } else {
            return;
        };
        self.current = CommentBlock {
            lineno: line.lineno,
            ..Default::default()
        };
        self.state = state;
    }

    fn in_block_a(&mut self, line: SourceLine) {
        let content = line.content();
        if !content.starts_with(FILLER) {
            debug!(
                "line {}: malformed comment starting at line {} abandoned",
                line.lineno, self.current.lineno
            );
            self.current = CommentBlock::default();
            self.state = State::WaitComment;
            self.wait_comment(line);
            return;
        }

        let rest = content.trim_start_matches(FILLER);
        if rest.trim_end() == "/" {
            self.end_comment();
        } else {
            self.current.lines.push(rest.trim_end().to_string());
        }
    }

    fn in_block_b(&mut self, line: SourceLine, width: usize) {
        let inner = line
            .text
            .trim()
            .strip_prefix(OPEN)
            .and_then(|rest| rest.strip_suffix(CLOSE));

        let Some(inner) = inner else {
            self.end_comment();
            self.feed(line);
            return;
        };

        let inner = inner.trim_end();
        if inner.len() == width && is_filler(inner) {
            self.end_comment();
        } else {
            self.current.lines.push(inner.to_string());
        }
    }

    fn in_source(&mut self, line: SourceLine) {
        if opens_comment(line.content()) && !continues_source(line.content()) {
            self.flush();
            self.wait_comment(line);
            return;
        }

        if self.state == State::WaitSource && !line.is_blank() {
            self.state = State::InSource;
        }
        self.current.code.push(line);
    }

    /// Close the comment body: keep it when it has content, drop it otherwise.
    fn end_comment(&mut self) {
        if self.current.lines.is_empty() {
            self.current = CommentBlock::default();
            self.state = State::WaitComment;
        } else {
            self.state = State::WaitSource;
        }
    }

    fn flush(&mut self) {
        let block = std::mem::take(&mut self.current);
        self.blocks.push(block);
        self.state = State::WaitComment;
    }
}

/// Classify a whole text.
pub fn classify(input: &str) -> Vec<CommentBlock> {
    let mut classifier = Classifier::new();
    for (i, line) in input.lines().enumerate() {
        classifier.feed(SourceLine::new(i + 1, line));
    }
    classifier.finish()
}

fn is_filler(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c == FILLER)
}

/// `/***` or longer with nothing after the filler run. A bare `/**`
/// opens an ordinary doc comment.
fn opens_block_a(content: &str) -> bool {
    content
        .trim_end()
        .strip_prefix(OPEN)
        .is_some_and(|filler| filler.len() >= 2 && is_filler(filler))
}

/// `/****/`, returning the filler width between the two tokens.
fn opens_block_b(content: &str) -> Option<usize> {
    let inner = content
        .trim_end()
        .strip_prefix(OPEN)?
        .strip_suffix(CLOSE)?;
    is_filler(inner).then_some(inner.len())
}

fn opens_comment(content: &str) -> bool {
    content.starts_with(OPEN)
}

/// A comment whose first character (after `/*` and one optional space) is
/// a continuation sigil.
fn continues_source(content: &str) -> bool {
    let Some(rest) = content.strip_prefix(OPEN) else {
        return false;
    };
    let rest = rest.strip_prefix(' ').unwrap_or(rest);
    rest.starts_with(CONTINUATION_SIGILS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn code_text(block: &CommentBlock) -> Vec<&str> {
        block.code.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn source_line_margin() {
        let line = SourceLine::new(1, "    foo bar");
        assert_eq!(line.margin(), 4);
        assert_eq!(line.content(), "foo bar");
        assert!(SourceLine::new(2, "  \t ").is_blank());
    }

    #[test]
    fn style_a_block_with_excerpt() {
        let input = "\
/**************************
 *
 * <Struct>
 *   FT_Foo
 *
 */
typedef struct FT_Foo_ FT_Foo;

int after;
";
        let blocks = classify(input);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lineno, 1);
        assert_eq!(blocks[0].lines, ["", " <Struct>", "   FT_Foo", ""]);
        assert_eq!(
            code_text(&blocks[0]),
            ["typedef struct FT_Foo_ FT_Foo;", "", "int after;"]
        );
        assert_eq!(blocks[0].code[0].lineno, 7);
    }

    #[test]
    fn style_a_excerpt_stops_at_next_comment() {
        let input = "\
  /****
   * <Type>
   *   FT_A
   */
  typedef int FT_A;
  /****
   * <Type>
   *   FT_B
   */
  typedef int FT_B;
";
        let blocks = classify(input);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].lines, [" <Type>", "   FT_A"]);
        assert_eq!(code_text(&blocks[0]), ["  typedef int FT_A;"]);
        assert_eq!(blocks[1].lines, [" <Type>", "   FT_B"]);
        assert_eq!(code_text(&blocks[1]), ["  typedef int FT_B;"]);
    }

    #[test]
    fn style_b_block() {
        let input = "\
/************/
/*          */
/* <Struct> */
/*  MyType  */
/*          */
/************/
typedef struct MyType_ MyType;
";
        let blocks = classify(input);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines, ["", " <Struct>", "  MyType", ""]);
        assert_eq!(code_text(&blocks[0]), ["typedef struct MyType_ MyType;"]);
    }

    #[test]
    fn style_b_ends_on_nonconforming_line() {
        let input = "\
/*******/
/* <X> */
/*  Foo */
int foo;
";
        let blocks = classify(input);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines, [" <X>", "  Foo"]);
        assert_eq!(code_text(&blocks[0]), ["int foo;"]);
    }

    #[test]
    fn style_b_nonconforming_line_can_open_next_comment() {
        let input = "\
/*******/
/* <X> */
/*  Foo */
/****
 * <Y>
 *  Bar
 */
int bar;
";
        let blocks = classify(input);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].code.is_empty());
        assert_eq!(blocks[1].lines, [" <Y>", "  Bar"]);
        assert_eq!(code_text(&blocks[1]), ["int bar;"]);
    }

    #[test]
    fn style_b_divider_of_other_width_is_content() {
        let input = "\
/********/
/* <X>  */
/* **** */
/********/
";
        let blocks = classify(input);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines, [" <X>", " ****"]);
    }

    #[test]
    fn malformed_style_a_is_abandoned() {
        let input = "\
/*****
 * <Struct>
int oops;
 * FT_Lost
 */
int x;
";
        assert!(classify(input).is_empty());
    }

    #[test]
    fn malformed_style_a_line_is_reexamined() {
        let input = "\
/*****
 * <Struct>
/*****
 * <Type>
 *  FT_Kept
 */
";
        let blocks = classify(input);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lineno, 3);
        assert_eq!(blocks[0].lines, [" <Type>", "  FT_Kept"]);
    }

    #[test]
    fn empty_comment_is_dropped() {
        let input = "\
/*****
 */
int x;
/**********/
/**********/
int y;
";
        assert!(classify(input).is_empty());
    }

    #[test]
    fn continuation_sigils_keep_excerpt_open() {
        let input = "\
/****
 * <Macro>
 *   FT_CONFIG
 */
#define FT_CONFIG_A
/* #define FT_CONFIG_B */
/* @internal */
/*@ keep this too */
#define FT_CONFIG_C
/* */
#define IGNORED
";
        let blocks = classify(input);
        assert_eq!(blocks.len(), 1);
        assert_eq!(
            code_text(&blocks[0]),
            [
                "#define FT_CONFIG_A",
                "/* #define FT_CONFIG_B */",
                "/* @internal */",
                "/*@ keep this too */",
                "#define FT_CONFIG_C",
            ]
        );
    }

    #[test]
    fn end_of_input_flushes_pending_block() {
        let input = "/****\n * <Type>\n *  FT_End\n */\n\ntypedef int FT_End;";
        let blocks = classify(input);
        assert_eq!(blocks.len(), 1);
        assert_eq!(code_text(&blocks[0]), ["", "typedef int FT_End;"]);
    }

    #[test]
    fn unclosed_style_b_at_end_of_input_is_kept() {
        let input = "/*****/\n/* <A> */\n/* B   */";
        let blocks = classify(input);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines, [" <A>", " B"]);
    }

    #[test]
    fn unclosed_style_a_at_end_of_input_is_dropped() {
        assert!(classify("/****\n * <A>\n *  B\n").is_empty());
    }

    #[test]
    fn streaming_feed_matches_classify() {
        let input = "/****\n * <Type>\n *  T\n */\ntypedef int T;\n";
        let mut classifier = Classifier::new();
        for (i, line) in input.lines().enumerate() {
            classifier.feed(SourceLine::new(i + 1, line));
        }
        assert_eq!(classifier.finish(), classify(input));
    }

    #[test]
    fn plain_comments_are_not_openings() {
        assert!(!opens_block_a("/* hello */"));
        assert!(!opens_block_a("/**"));
        assert!(!opens_block_a("/**   "));
        assert!(opens_block_a("/***"));
        assert!(opens_block_a("/*******   "));
        assert_eq!(opens_block_b("/**/"), None);
        assert_eq!(opens_block_b("/***/"), Some(1));
        assert_eq!(opens_block_b("/* x */"), None);
    }
}
