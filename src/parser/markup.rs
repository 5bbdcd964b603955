//! Marker splitter: cuts a comment body at `<Tag>` / `@tag:` headers.

use crate::model::{Marker, MarkerTag};
use crate::parser::content;
use regex::Regex;
use std::sync::LazyLock;

static RE_TAG_ANGLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*<([A-Za-z0-9_]+)>").unwrap());

static RE_TAG_AT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*@([A-Za-z0-9_]+):").unwrap());

/// A marker whose lines have not been parsed into fields yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMarker {
    pub tag: MarkerTag,
    pub lines: Vec<String>,
}

impl RawMarker {
    pub fn parse(&self) -> Marker {
        Marker {
            tag: self.tag.clone(),
            fields: content::parse_fields(&self.lines),
        }
    }
}

/// Split comment body lines into markers.
///
/// Lines before the first marker header are discarded. Text following a
/// header on the same line becomes the marker's first line, with the header
/// replaced by spaces so column positions are unchanged.
pub fn split_markers(lines: &[String]) -> Vec<RawMarker> {
    let mut markers = Vec::new();
    let mut current: Option<RawMarker> = None;

    for line in lines {
        if let Some((name, end)) = match_tag(line) {
            flush(&mut markers, current.take());
            let blanked = " ".repeat(line[..end].chars().count());
            current = Some(RawMarker {
                tag: MarkerTag::from_name(name),
                lines: vec![format!("{}{}", blanked, &line[end..])],
            });
        } else if let Some(marker) = current.as_mut() {
            marker.lines.push(line.clone());
        }
    }
    flush(&mut markers, current);

    markers
}

/// Match a marker header, returning the tag name and the end of the header.
fn match_tag(line: &str) -> Option<(&str, usize)> {
    [&*RE_TAG_ANGLE, &*RE_TAG_AT].iter().find_map(|re| {
        let caps = re.captures(line)?;
        let name = caps.get(1)?.as_str();
        Some((name, caps.get(0)?.end()))
    })
}

fn flush(markers: &mut Vec<RawMarker>, marker: Option<RawMarker>) {
    let Some(mut marker) = marker else {
        return;
    };

    let is_blank = |l: &String| l.trim().is_empty();
    let start = marker
        .lines
        .iter()
        .position(|l| !is_blank(l))
        .unwrap_or(marker.lines.len());
    let end = marker
        .lines
        .iter()
        .rposition(|l| !is_blank(l))
        .map_or(start, |i| i + 1);

    if start >= end {
        return;
    }
    marker.lines = marker.lines[start..end].to_vec();
    markers.push(marker);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn angle_and_at_syntax() {
        let markers = split_markers(&lines(&[
            "",
            " <Struct>",
            "   FT_Foo",
            "",
            " @description:",
            "   A foo.",
            "",
        ]));
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].tag, MarkerTag::Struct);
        assert_eq!(markers[0].lines, ["   FT_Foo"]);
        assert_eq!(markers[1].tag, MarkerTag::Description);
        assert_eq!(markers[1].lines, ["   A foo."]);
    }

    #[test]
    fn tag_names_are_lowercased() {
        let markers = split_markers(&lines(&["<INPUT>", "  face"]));
        assert_eq!(markers[0].tag, MarkerTag::Input);
        let markers = split_markers(&lines(&["@MyTag:", "  x"]));
        assert_eq!(markers[0].tag, MarkerTag::Other("mytag".to_string()));
    }

    #[test]
    fn text_after_header_keeps_its_column() {
        let markers = split_markers(&lines(&[" <Return> FreeType error code.", "          0 means success."]));
        assert_eq!(
            markers[0].lines,
            ["          FreeType error code.", "          0 means success."]
        );
    }

    #[test]
    fn lines_before_first_marker_are_discarded() {
        let markers = split_markers(&lines(&["Some preamble.", "", "<Note>", "  kept"]));
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].tag, MarkerTag::Note);
        assert_eq!(markers[0].lines, ["  kept"]);
    }

    #[test]
    fn empty_marker_is_dropped() {
        let markers = split_markers(&lines(&["<Note>", "", "<Since>", "  2.10"]));
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].tag, MarkerTag::Since);
    }

    #[test]
    fn inner_blank_lines_are_kept() {
        let markers = split_markers(&lines(&["<Note>", "", "  a", "", "  b", "", ""]));
        assert_eq!(markers[0].lines, ["  a", "", "  b"]);
    }

    #[test]
    fn non_word_tags_are_content() {
        let markers = split_markers(&lines(&["<Note>", "  <a-b> is not a tag", "  @x y: neither"]));
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].lines.len(), 3);
    }

    #[test]
    fn no_markers_at_all() {
        assert!(split_markers(&lines(&["just a comment", "nothing else"])).is_empty());
    }

    #[test]
    fn parse_builds_fields() {
        let markers = split_markers(&lines(&["<Foo>", "  some text"]));
        let marker = markers[0].parse();
        assert_eq!(marker.tag, MarkerTag::Other("foo".to_string()));
        assert_eq!(marker.fields.len(), 1);
        assert_eq!(marker.fields[0].name, None);
    }
}
