// src/text.rs
//! HTML → readable text for the classifier.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_SCRIPT_STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>").unwrap());
static RE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
// Block-level boundaries become a space so adjacent cells don't fuse into one word.
static RE_BLOCK_TAGS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</?(p|div|br|tr|td|th|li|ul|ol|table|h[1-6]|title|body|html)\b[^>]*>").unwrap()
});
// A tag opens with a letter, `!` or `?` (after an optional `/`); bare `<` in prose is left alone.
static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)</?[A-Za-z!?][^>]*>").unwrap());
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strip markup, decode entities and collapse whitespace.
///
/// Plain text passes through with only whitespace collapsed.
pub fn extract_text(raw: &str) -> String {
    // 1) Drop non-content blocks
    let mut out = RE_SCRIPT_STYLE.replace_all(raw, " ").into_owned();
    out = RE_COMMENT.replace_all(&out, " ").into_owned();

    // 2) Strip tags (block tags leave a gap, inline tags don't)
    out = RE_BLOCK_TAGS.replace_all(&out, " ").into_owned();
    out = RE_TAGS.replace_all(&out, "").into_owned();

    // 3) Entities after tags so decoded `&lt;` can't be mistaken for markup
    out = html_escape::decode_html_entities(&out).into_owned();

    // 4) Typographic quotes and dashes to ASCII; filings love U+2011 in "cyber‑attack"
    out = out
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{2010}', '\u{2011}', '\u{2012}', '\u{2013}'], "-");

    // 5) Collapse whitespace (Unicode \s covers NBSP)
    RE_WS.replace_all(&out, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markup_and_entities() {
        let html = r#"<html><head><style>p{color:red}</style></head>
            <body><p><b>Item&nbsp;1.05</b>&#160;Material Cybersecurity Incidents</p>
            <script>var x = "Item 8.01";</script></body></html>"#;
        assert_eq!(extract_text(html), "Item 1.05 Material Cybersecurity Incidents");
    }

    #[test]
    fn table_cells_do_not_fuse() {
        let html = "<table><tr><td>Item 8.01</td><td>Other Events</td></tr></table>";
        assert_eq!(extract_text(html), "Item 8.01 Other Events");
    }

    #[test]
    fn inline_tags_do_not_split_words() {
        assert_eq!(extract_text("cyber<span>attack</span>"), "cyberattack");
    }

    #[test]
    fn non_breaking_hyphen_is_normalized() {
        assert_eq!(extract_text("a cyber\u{2011}attack"), "a cyber-attack");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(extract_text("  threat   actor\n"), "threat actor");
    }

    #[test]
    fn comparison_signs_in_prose_survive() {
        assert_eq!(
            extract_text("revenue < 5% and margin > 2%; a cyberattack occurred"),
            "revenue < 5% and margin > 2%; a cyberattack occurred"
        );
        assert_eq!(extract_text("a <b>cyber</b> x < y"), "a cyber x < y");
        assert_eq!(
            extract_text(r#"<?xml version="1.0"?><html><p>breach</p></html>"#),
            "breach"
        );
    }
}
