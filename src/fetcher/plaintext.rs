//! Conversion of comment HTML to display text.

use std::sync::LazyLock;

use regex::Regex;

static PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<p\s*/?>").expect("paragraph pattern is valid"));

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

/// Convert comment HTML to plain text.
///
/// Paragraph breaks become newlines, every other tag is dropped, and entities
/// are decoded last so escaped markup survives as literal text.
#[must_use]
pub fn to_plaintext(html: &str) -> String {
    let with_breaks = PARAGRAPH.replace_all(html, "\n");
    let stripped = TAG.replace_all(&with_breaks, "");
    html_escape::decode_html_entities(&stripped).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(to_plaintext("nothing to see"), "nothing to see");
    }

    #[test]
    fn test_paragraphs_become_newlines() {
        assert_eq!(to_plaintext("first<p>second<p>third"), "first\nsecond\nthird");
        assert_eq!(to_plaintext("a<P>b"), "a\nb");
    }

    #[test]
    fn test_links_keep_text() {
        let html = r#"see <a href="https:&#x2F;&#x2F;example.com" rel="nofollow">https:&#x2F;&#x2F;example.com</a>"#;
        assert_eq!(to_plaintext(html), "see https://example.com");
    }

    #[test]
    fn test_entities_decoded() {
        assert_eq!(
            to_plaintext("it&#x27;s &quot;fine&quot; &amp; dandy"),
            "it's \"fine\" & dandy"
        );
    }

    #[test]
    fn test_escaped_markup_stays_literal() {
        assert_eq!(to_plaintext("&lt;script&gt;alert(1)&lt;/script&gt;"), "<script>alert(1)</script>");
    }

    #[test]
    fn test_code_blocks() {
        let html = "look:<p><pre><code>  fn main() {}\n</code></pre>";
        assert_eq!(to_plaintext(html), "look:\n  fn main() {}\n");
    }
}
