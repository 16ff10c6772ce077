use once_cell::sync::Lazy;
use regex::Regex;

static REPEATED_BREAKS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:<br\s*/?>\s*){2,}").expect("valid line break regex"));

static HEADING_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<h([0-9])>").expect("valid heading regex"));

const HEADING_STYLE: &str = "margin-bottom: 0px;";

/// Tidy webhook HTML for display. The result is still raw markup and is not
/// sanitized.
pub fn format_response(html: &str) -> String {
    let collapsed = collapse_line_breaks(html);
    space_headings(&collapsed)
}

/// Replace every run of two or more `<br>` tags (and the whitespace around
/// them) with a single `<br>`.
pub fn collapse_line_breaks(html: &str) -> String {
    REPEATED_BREAKS_RE.replace_all(html, "<br>").into_owned()
}

/// Rewrite `<hN>text</hN>` as `<hN style="margin-bottom: 0px;">text</hN>`.
///
/// The closing tag must be the nearest one of the same level and the text may
/// not span a line terminator. Scanning resumes after each rewritten heading.
pub fn space_headings(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut copied_to = 0;
    let mut search_from = 0;

    while let Some(caps) = HEADING_OPEN_RE.captures_at(html, search_from) {
        let (Some(open), Some(level)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let level = level.as_str();

        let text_start = open.end();
        let Some(text_len) = find_closing_tag(&html[text_start..], level) else {
            search_from = open.end();
            continue;
        };
        let text = &html[text_start..text_start + text_len];
        let close_end = text_start + text_len + closing_tag_len();

        out.push_str(&html[copied_to..open.start()]);
        out.push_str(&format!(
            r#"<h{level} style="{HEADING_STYLE}">{text}</h{level}>"#
        ));
        copied_to = close_end;
        search_from = close_end;
    }

    out.push_str(&html[copied_to..]);
    out
}

fn closing_tag_len() -> usize {
    "</h0>".len()
}

/// Offset of the first `</hN>` in `rest` that comes before any line terminator.
fn find_closing_tag(rest: &str, level: &str) -> Option<usize> {
    let line_end = rest
        .find(['\n', '\r', '\u{2028}', '\u{2029}'])
        .unwrap_or(rest.len());
    let line = rest[..line_end].to_ascii_lowercase();
    line.find(&format!("</h{}>", level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_breaks_collapse_to_one() {
        assert_eq!(collapse_line_breaks("a<br><br><br>b"), "a<br>b");
    }

    #[test]
    fn test_break_variants_and_whitespace() {
        assert_eq!(
            collapse_line_breaks("a<BR/>\n  <br />\n<br>\nb"),
            "a<br>b"
        );
    }

    #[test]
    fn test_single_break_untouched() {
        assert_eq!(collapse_line_breaks("a<br/>b<br>c"), "a<br/>b<br>c");
    }

    #[test]
    fn test_heading_gets_spacing() {
        assert_eq!(
            space_headings("<h2>Title</h2>"),
            r#"<h2 style="margin-bottom: 0px;">Title</h2>"#
        );
    }

    #[test]
    fn test_heading_case_insensitive_lowercases_tag() {
        assert_eq!(
            space_headings("<H3>Fit</h3>"),
            r#"<h3 style="margin-bottom: 0px;">Fit</h3>"#
        );
    }

    #[test]
    fn test_mismatched_levels_skip_to_matching_close() {
        assert_eq!(
            space_headings("<h2>a</h3>b</h2>"),
            r#"<h2 style="margin-bottom: 0px;">a</h3>b</h2>"#
        );
        assert_eq!(space_headings("<h2>a</h3>"), "<h2>a</h3>");
    }

    #[test]
    fn test_heading_text_cannot_span_lines() {
        assert_eq!(space_headings("<h1>a\nb</h1>"), "<h1>a\nb</h1>");
    }

    #[test]
    fn test_headings_with_attributes_untouched() {
        let html = r#"<h2 class="x">Title</h2>"#;
        assert_eq!(space_headings(html), html);
    }

    #[test]
    fn test_nested_heading_left_alone() {
        assert_eq!(
            space_headings("<h2><h3>x</h3></h2>"),
            r#"<h2 style="margin-bottom: 0px;"><h3>x</h3></h2>"#
        );
    }

    #[test]
    fn test_multiple_headings_and_surrounding_text() {
        assert_eq!(
            space_headings("<p>intro</p><h1>A</h1><p>mid</p><h4>B</h4>end"),
            concat!(
                "<p>intro</p>",
                r#"<h1 style="margin-bottom: 0px;">A</h1>"#,
                "<p>mid</p>",
                r#"<h4 style="margin-bottom: 0px;">B</h4>"#,
                "end"
            )
        );
    }

    #[test]
    fn test_format_response_applies_both_rewrites() {
        let raw = "<h2>Verdict</h2><br><br><br><p>Strong fit</p>";
        assert_eq!(
            format_response(raw),
            r#"<h2 style="margin-bottom: 0px;">Verdict</h2><br><p>Strong fit</p>"#
        );
    }

    #[test]
    fn test_markup_is_not_sanitized() {
        let raw = "<script>alert(1)</script>";
        assert_eq!(format_response(raw), raw);
    }
}
