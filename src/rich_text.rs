//! Minimal markup for page-authored text: `**bold**`, `*italic*` and bare
//! `http(s)://` links. Input is always escaped first.

use lazy_static::lazy_static;
use regex::Regex;

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const LINK_OPEN: char = '\u{E000}';
const LINK_CLOSE: char = '\u{E001}';

/// Escapes `raw` and applies, in order: autolinks, bold, italic. Single
/// newlines become `<br>`. Links are held out of the emphasis passes, so a
/// marker next to a link wraps the whole anchor.
pub fn format(raw: &str) -> String {
    lazy_static! {
        static ref URL_RE: Regex = Regex::new(r"https?://[^\s<)*]+").unwrap();
        static ref URL_STOP_RE: Regex = Regex::new(r"&(?:quot|#39|lt|gt);").unwrap();
        static ref LINK_SLOT_RE: Regex = Regex::new("\u{E000}(\\d+)\u{E001}").unwrap();
        static ref BOLD_RE: Regex = Regex::new(r"\*\*([^*]+)\*\*").unwrap();
        static ref ITALIC_RE: Regex = Regex::new(r"\*([^*]+)\*").unwrap();
    }

    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|ch| *ch != LINK_OPEN && *ch != LINK_CLOSE)
        .collect();
    let escaped = escape_html(&cleaned);

    let mut links = Vec::new();
    let slotted = URL_RE.replace_all(&escaped, |caps: &regex::Captures| {
        let matched = &caps[0];
        let end = URL_STOP_RE.find(matched).map_or(matched.len(), |stop| stop.start());
        let url = matched[..end].trim_end_matches(['.', ',', ';', ':', '!', '?']);
        if url.ends_with("//") {
            return matched.to_string();
        }
        let trailing = &matched[url.len()..];
        links.push(format!(
            r#"<a class="btn btn-link" href="{url}" target="_blank" rel="noopener noreferrer">{url}</a>"#
        ));
        format!("{LINK_OPEN}{}{LINK_CLOSE}{trailing}", links.len() - 1)
    });
    let bold = BOLD_RE.replace_all(&slotted, "<strong>$1</strong>");
    let italic = ITALIC_RE.replace_all(&bold, "<em>$1</em>");
    let linked = LINK_SLOT_RE.replace_all(&italic, |caps: &regex::Captures| {
        caps[1]
            .parse::<usize>()
            .ok()
            .and_then(|slot| links.get(slot))
            .cloned()
            .unwrap_or_default()
    });
    linked.replace("\r\n", "\n").replace('\n', "<br>")
}

/// Like [`format`], with blank lines separating `<p>` blocks.
pub fn format_paragraphs(raw: &str) -> String {
    lazy_static! {
        static ref BLANK_LINE_RE: Regex = Regex::new(r"\n[ \t\r]*\n").unwrap();
    }

    BLANK_LINE_RE
        .split(raw.trim())
        .map(str::trim)
        .filter(|para| !para.is_empty())
        .map(|para| format!("<p>{}</p>", format(para)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn escapes_all_reserved_characters() {
        assert_eq!(
            format(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn applies_bold_then_italic() {
        assert_eq!(
            format("**torque** and *speed*"),
            "<strong>torque</strong> and <em>speed</em>"
        );
    }

    #[test]
    fn autolinks_bare_urls() {
        let html = format("CAD: https://cad.onshape.com/documents/abc. Done");
        assert_eq!(
            html,
            r#"CAD: <a class="btn btn-link" href="https://cad.onshape.com/documents/abc" target="_blank" rel="noopener noreferrer">https://cad.onshape.com/documents/abc</a>. Done"#
        );
    }

    #[test]
    fn emphasis_wraps_whole_links() {
        assert_eq!(
            format("*https://a.com/x*"),
            r#"<em><a class="btn btn-link" href="https://a.com/x" target="_blank" rel="noopener noreferrer">https://a.com/x</a></em>"#
        );
        assert_eq!(
            format("**see https://a.com/x**"),
            r#"<strong>see <a class="btn btn-link" href="https://a.com/x" target="_blank" rel="noopener noreferrer">https://a.com/x</a></strong>"#
        );
    }

    #[test]
    fn quoted_links_stop_before_the_quote() {
        assert_eq!(
            format(r#"See "https://a.com/x"."#),
            r#"See &quot;<a class="btn btn-link" href="https://a.com/x" target="_blank" rel="noopener noreferrer">https://a.com/x</a>&quot;."#
        );
        let html = format("'https://a.com/y' and https://a.com/z?a=1&b=2");
        assert!(html.contains(r#"href="https://a.com/y""#), "got: {html}");
        assert!(html.contains(r#"href="https://a.com/z?a=1&amp;b=2""#), "got: {html}");
    }

    #[test]
    fn markup_inside_text_is_never_raw_html() {
        let html = format("*<script>alert(1)</script>*");
        assert_eq!(html, "<em>&lt;script&gt;alert(1)&lt;/script&gt;</em>");
        assert!(!html.contains("<script"), "got: {html}");
    }

    #[test]
    fn unmatched_markers_stay_literal() {
        assert_eq!(format("2 * 3 = 6"), "2 * 3 = 6");
    }

    #[test]
    fn newlines_become_breaks() {
        assert_eq!(format("a\nb"), "a<br>b");
    }

    #[test]
    fn paragraphs_split_on_blank_lines() {
        assert_eq!(
            format_paragraphs("one\n\n  \ntwo\nthree"),
            "<p>one</p>\n<p>two<br>three</p>"
        );
        assert_eq!(format_paragraphs("   "), "");
    }
}
