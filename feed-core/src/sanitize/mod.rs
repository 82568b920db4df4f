//! Field sanitizing for the delimited feed
//!
//! - [`TextSanitizer::clean`]: plain text (titles, descriptions, brands)
//! - [`TextSanitizer::clean_url`]: links, percent-encoded per component
//! - [`clean_references`] / [`split_references`]: alternate title tokens
//!   for part-number style searches

pub mod html;

use crate::config::Separators;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

pub use html::{decode_entities, strip_html, strip_tags};

/// A non-digit, non-space character directly followed by a digit
static REFERENCE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^0-9\s])([0-9])").expect("valid regex"));

const URL_KEEP_SEGMENTS: [&str; 2] = ["http:", "https:"];

/// Stateless text cleaner bound to the feed's field separator
#[derive(Debug, Clone)]
pub struct TextSanitizer {
    field_separator: char,
    replacement: String,
    encoded_separator: String,
}

impl TextSanitizer {
    pub fn new(separators: &Separators) -> Self {
        let mut buf = [0u8; 4];
        let encoded_separator = separators
            .field
            .encode_utf8(&mut buf)
            .bytes()
            .map(|b| format!("%{b:02X}"))
            .collect();

        Self {
            field_separator: separators.field,
            replacement: separators.replacement.to_string(),
            encoded_separator,
        }
    }

    /// Clean a plain text field
    ///
    /// Decodes entities and strips markup, replaces the field separator,
    /// collapses whitespace to single spaces, trims, and drops leading
    /// quote characters. `clean(clean(x)) == clean(x)`.
    pub fn clean(&self, text: &str) -> String {
        let text = strip_html(text);
        let text = text.replace(self.field_separator, &self.replacement);

        let mut collapsed = String::with_capacity(text.len());
        for word in text.split_whitespace() {
            if !collapsed.is_empty() {
                collapsed.push(' ');
            }
            collapsed.push_str(word);
        }

        collapsed
            .trim_start_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace())
            .to_string()
    }

    /// Clean a link field
    ///
    /// Path segments are percent-encoded one by one, leaving the scheme and
    /// host alone. Query keys and values are form-encoded one by one. The
    /// field separator never survives: it is percent-encoded, not removed.
    pub fn clean_url(&self, url: &str) -> String {
        let url = url.trim();
        let mut parts = url.split('?');
        let base = parts.next().unwrap_or_default();

        let has_authority = has_authority(base);

        let mut cleaned = base
            .split('/')
            .enumerate()
            .map(|(idx, segment)| {
                let keep = segment.is_empty()
                    || URL_KEEP_SEGMENTS
                        .iter()
                        .any(|scheme| segment.eq_ignore_ascii_case(scheme))
                    || (has_authority && idx == 2);
                if keep {
                    Cow::Borrowed(segment)
                } else {
                    urlencoding::encode(segment)
                }
            })
            .collect::<Vec<_>>()
            .join("/");

        for query in parts {
            let params = query
                .split('&')
                .map(|param| {
                    param
                        .split('=')
                        .map(form_encode)
                        .collect::<Vec<_>>()
                        .join("=")
                })
                .collect::<Vec<_>>()
                .join("&");
            cleaned.push('?');
            cleaned.push_str(&params);
        }

        if cleaned.contains(self.field_separator) {
            cleaned = cleaned.replace(self.field_separator, &self.encoded_separator);
        }
        cleaned
    }
}

/// `http://host/...` or `https://host/...`
fn has_authority(base: &str) -> bool {
    URL_KEEP_SEGMENTS.iter().any(|scheme| {
        base.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
            && base[scheme.len()..].starts_with("//")
    })
}

/// Form-style encoding of a query component (space becomes `+`)
fn form_encode(part: &str) -> String {
    urlencoding::encode(part).replace("%20", "+")
}

/// Remove hyphens, so "AB-123" also matches "AB123"
pub fn clean_references(text: &str) -> String {
    text.replace('-', "")
}

/// Separate letters from a following digit, so "Model5X" also matches "Model 5X"
pub fn split_references(text: &str) -> String {
    REFERENCE_BOUNDARY.replace_all(text, "$1 $2").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitizer() -> TextSanitizer {
        TextSanitizer::new(&Separators::default())
    }

    #[test]
    fn test_clean_plain_text() {
        let s = sanitizer();
        assert_eq!(
            s.clean("  <p>Light   &amp; fast</p>\n<p>Trail\tshoe</p> "),
            "Light & fast Trail shoe"
        );
        assert_eq!(s.clean("\"'Quoted' title"), "Quoted' title");
        assert_eq!(s.clean(""), "");
    }

    #[test]
    fn test_clean_replaces_field_separator() {
        let s = sanitizer();
        assert_eq!(s.clean("Red | Blue"), "Red - Blue");
        assert_eq!(s.clean("Red &#124; Blue"), "Red - Blue");
    }

    #[test]
    fn test_clean_is_idempotent() {
        let s = sanitizer();
        let samples = [
            "&amp;lt;b&amp;gt;bold&amp;lt;/b&amp;gt;",
            "\" ' leading quotes",
            "a<br/>b<br>c",
            "x &lt; y &amp;&amp; y &gt; z",
            "pipes || everywhere |",
            "nbsp&nbsp;&nbsp;run",
            "<<b>b>",
            "AT&T <unterminated",
        ];
        for sample in samples {
            let once = s.clean(sample);
            assert_eq!(s.clean(&once), once, "sample {sample:?}");
        }
    }

    #[test]
    fn test_clean_url() {
        let s = sanitizer();
        assert_eq!(
            s.clean_url(" http://shop.example.com/catalog/product info.php?currency=EUR&products_id=42 "),
            "http://shop.example.com/catalog/product%20info.php?currency=EUR&products_id=42"
        );
        assert_eq!(
            s.clean_url("https://localhost:8080/images/caf\u{e9} 1.jpg"),
            "https://localhost:8080/images/caf%C3%A9%201.jpg"
        );
        assert_eq!(
            s.clean_url("http://h/p?q=a b&x=1|2"),
            "http://h/p?q=a+b&x=1%7C2"
        );
    }

    #[test]
    fn test_clean_url_encodes_custom_separator() {
        let separators = Separators {
            field: '~',
            ..Separators::default()
        };
        let s = TextSanitizer::new(&separators);
        assert_eq!(s.clean_url("http://h/~user/a.jpg"), "http://h/%7Euser/a.jpg");
    }

    #[test]
    fn test_references() {
        assert_eq!(clean_references("Model-5X"), "Model5X");
        assert_eq!(split_references("Model5X"), "Model 5X");
        assert_eq!(split_references("AB12 C3"), "AB 12 C 3");
        assert_eq!(split_references("12 34"), "12 34");
    }
}
