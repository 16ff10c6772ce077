//! Terminal presentation of assessment markup.
//!
//! The webhook answers with HTML meant for a browser. Here it is flattened
//! into styled lines: block elements start new lines, headings stand out and
//! `script`/`style` content is dropped. Text keeps its own line breaks.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use scraper::{Html, Node};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "table", "section",
    "article", "blockquote", "pre", "header", "footer",
];

fn is_block(name: &str) -> bool {
    BLOCK_ELEMENTS.contains(&name)
}

fn is_heading(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

pub fn markup_to_lines(html: &str) -> Vec<Line<'static>> {
    let fragment = Html::parse_fragment(html);
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut current_block = None;

    for node in fragment.root_element().descendants() {
        match node.value() {
            Node::Element(element) if element.name() == "br" => {
                lines.push(Line::from(std::mem::take(&mut spans)));
            }
            Node::Text(text) => {
                let content: &str = text;
                if content.trim().is_empty() {
                    continue;
                }

                let mut style = Style::default();
                let mut skip = false;
                for ancestor in node.ancestors() {
                    let Some(element) = ancestor.value().as_element() else {
                        continue;
                    };
                    match element.name() {
                        "script" | "style" | "head" | "title" => skip = true,
                        "strong" | "b" => style = style.add_modifier(Modifier::BOLD),
                        "em" | "i" => style = style.add_modifier(Modifier::ITALIC),
                        "a" => style = style.fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
                        name if is_heading(name) => {
                            style = style.fg(Color::Cyan).add_modifier(Modifier::BOLD)
                        }
                        _ => {}
                    }
                }
                if skip {
                    continue;
                }

                let block = node
                    .ancestors()
                    .find(|a| a.value().as_element().is_some_and(|e| is_block(e.name())));
                let block_id = block.map(|b| b.id());
                if block_id != current_block {
                    if !spans.is_empty() {
                        lines.push(Line::from(std::mem::take(&mut spans)));
                    }
                    current_block = block_id;
                    let is_list_item = block
                        .and_then(|b| b.value().as_element())
                        .is_some_and(|e| e.name() == "li");
                    if is_list_item {
                        spans.push(Span::styled("• ", Style::default().fg(Color::Yellow)));
                    }
                }

                let mut segments = content.split('\n').peekable();
                while let Some(segment) = segments.next() {
                    if !segment.is_empty() {
                        spans.push(Span::styled(segment.to_string(), style));
                    }
                    if segments.peek().is_some() && !spans.is_empty() {
                        lines.push(Line::from(std::mem::take(&mut spans)));
                    }
                }
            }
            _ => {}
        }
    }

    if !spans.is_empty() {
        lines.push(Line::from(spans));
    }
    lines
}

/// Break styled lines into rows at most `width` columns wide, breaking at
/// whitespace where possible. Each returned line occupies exactly one row,
/// so the row count is what a scroll offset has to be measured against.
pub fn wrap_lines(lines: Vec<Line<'static>>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return lines;
    }

    let mut rows = Vec::with_capacity(lines.len());
    for line in lines {
        let mut row: Vec<Span<'static>> = Vec::new();
        let mut row_width = 0;

        for span in line.spans {
            let style = span.style;
            for piece in split_words(&span.content) {
                let piece_width = UnicodeWidthStr::width(piece);
                if row_width > 0 && row_width + piece_width > width {
                    rows.push(Line::from(std::mem::take(&mut row)));
                    row_width = 0;
                    // Whitespace that caused the break is not carried over
                    if piece.trim().is_empty() {
                        continue;
                    }
                }

                if piece_width <= width {
                    push_text(&mut row, piece, style);
                    row_width += piece_width;
                    continue;
                }

                // A single word wider than the pane is split by character
                for ch in piece.chars() {
                    let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
                    if row_width > 0 && row_width + ch_width > width {
                        rows.push(Line::from(std::mem::take(&mut row)));
                        row_width = 0;
                    }
                    let mut buf = [0; 4];
                    push_text(&mut row, ch.encode_utf8(&mut buf), style);
                    row_width += ch_width;
                }
            }
        }
        rows.push(Line::from(row));
    }
    rows
}

/// Split into alternating runs of whitespace and non-whitespace
fn split_words(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut in_space = None;
    for (i, ch) in text.char_indices() {
        let space = ch.is_whitespace();
        if in_space.is_some_and(|previous| previous != space) {
            pieces.push(&text[start..i]);
            start = i;
        }
        in_space = Some(space);
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

fn push_text(row: &mut Vec<Span<'static>>, text: &str, style: Style) {
    match row.last_mut() {
        Some(last) if last.style == style => last.content.to_mut().push_str(text),
        _ => row.push(Span::styled(text.to_string(), style)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line<'static>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_blocks_start_new_lines() {
        let lines = markup_to_lines("<h2>Verdict</h2><p>Strong fit</p><p>Second</p>");
        assert_eq!(plain(&lines), vec!["Verdict", "Strong fit", "Second"]);
    }

    #[test]
    fn test_heading_is_bold() {
        let lines = markup_to_lines(r#"<h2 style="margin-bottom: 0px;">Verdict</h2>"#);
        let style = lines[0].spans[0].style;
        assert!(style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(style.fg, Some(Color::Cyan));
    }

    #[test]
    fn test_inline_elements_stay_on_one_line() {
        let lines = markup_to_lines("<p>A <strong>bold</strong> claim</p>");
        assert_eq!(plain(&lines), vec!["A bold claim"]);
        assert!(lines[0].spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_line_breaks() {
        let lines = markup_to_lines("one<br>two");
        assert_eq!(plain(&lines), vec!["one", "two"]);
    }

    #[test]
    fn test_list_items_get_bullets() {
        let lines = markup_to_lines("<ul><li>Stage</li><li>Sector</li></ul>");
        assert_eq!(plain(&lines), vec!["• Stage", "• Sector"]);
    }

    #[test]
    fn test_scripts_are_dropped() {
        let lines = markup_to_lines("<p>Visible</p><script>alert(1)</script>");
        assert_eq!(plain(&lines), vec!["Visible"]);
    }

    #[test]
    fn test_text_newlines_preserved() {
        let lines = markup_to_lines("<p>first\nsecond</p>");
        assert_eq!(plain(&lines), vec!["first", "second"]);
    }

    #[test]
    fn test_wrap_breaks_at_spaces() {
        let rows = wrap_lines(markup_to_lines("<p>alpha beta gamma</p>"), 11);
        let text: Vec<String> = plain(&rows).iter().map(|r| r.trim_end().to_string()).collect();
        assert_eq!(text, vec!["alpha beta", "gamma"]);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let rows = wrap_lines(vec![Line::from("abcdefghij")], 4);
        assert_eq!(plain(&rows), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_counts_display_width() {
        let rows = wrap_lines(vec![Line::from("日本語")], 4);
        assert_eq!(plain(&rows), vec!["日本", "語"]);
    }

    #[test]
    fn test_wrap_keeps_styles_and_blank_lines() {
        let lines = markup_to_lines("<p>plain <strong>bold words here</strong></p><br><br>");
        let rows = wrap_lines(lines, 10);

        assert_eq!(rows.len(), 3);
        let bold = &rows[1].spans[0];
        assert_eq!(bold.content.as_ref(), "words here");
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
        assert!(rows[2].spans.is_empty());
    }
}
