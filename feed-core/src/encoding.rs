//! Charset utilities for the feed output
//!
//! Catalog text often comes from tables that mix UTF-8 with legacy
//! single-byte data. This module provides:
//! - Repairing byte strings into valid UTF-8 (`to_utf8`)
//! - Encoding text to ISO-8859-1 for Latin-1 feeds (`to_latin1`)
//! - The [`OutputCharset`] switch used by the writer

use std::borrow::Cow;

/// Character set of the emitted feed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputCharset {
    #[default]
    Utf8,
    Latin1,
}

impl OutputCharset {
    /// `latin1=1` request flag
    pub fn from_latin1_flag(latin1: bool) -> Self {
        if latin1 { Self::Latin1 } else { Self::Utf8 }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Latin1 => "ISO-8859-1",
        }
    }

    /// Content type for the transport layer
    pub fn content_type(&self) -> String {
        format!("text/plain; charset={}", self.label().to_lowercase())
    }

    /// Encode feed text to this charset
    pub fn encode<'a>(&self, text: &'a str) -> Cow<'a, [u8]> {
        match self {
            Self::Utf8 => Cow::Borrowed(text.as_bytes()),
            Self::Latin1 if text.is_ascii() => Cow::Borrowed(text.as_bytes()),
            Self::Latin1 => Cow::Owned(to_latin1(text)),
        }
    }
}

/// Repair a byte string into valid UTF-8
///
/// Valid UTF-8 sequences are kept as is. Every byte that is not part of a
/// valid sequence is read as Windows-1252, so `0xE9` becomes `é` and
/// `0x93`/`0x94` become curly quotes. Total for every byte value: the five
/// bytes Windows-1252 leaves undefined map to the matching C1 control.
pub fn to_utf8(bytes: &[u8]) -> Cow<'_, str> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Cow::Borrowed(text);
    }

    let mut result = String::with_capacity(bytes.len() + bytes.len() / 2);
    for chunk in bytes.utf8_chunks() {
        result.push_str(chunk.valid());

        let invalid = chunk.invalid();
        if !invalid.is_empty() {
            let (decoded, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(invalid);
            result.push_str(&decoded);
        }
    }
    result.into()
}

/// Encode text as ISO-8859-1
///
/// Characters above U+00FF have no Latin-1 byte and become `?`.
pub fn to_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_utf8_is_borrowed() {
        let text = "Café € 你好";
        assert!(matches!(to_utf8(text.as_bytes()), Cow::Borrowed(s) if s == text));
    }

    #[test]
    fn test_repair_windows_1252_bytes() {
        assert_eq!(to_utf8(b"Caf\xE9"), "Café");
        assert_eq!(to_utf8(b"\x93quoted\x94"), "\u{201C}quoted\u{201D}");
        assert_eq!(to_utf8(b"10\x80"), "10€");
    }

    #[test]
    fn test_repair_mixed_input() {
        // valid UTF-8 "é" next to a stray Latin-1 "é"
        let mut bytes = "Crème ".as_bytes().to_vec();
        bytes.extend_from_slice(b"br\xFBl\xE9e");
        assert_eq!(to_utf8(&bytes), "Crème brûlée");
    }

    #[test]
    fn test_repair_is_total() {
        for b in 0x80..=0xFFu8 {
            let input = [b];
            let repaired = to_utf8(&input);
            assert_eq!(repaired.chars().count(), 1, "byte {b:#04x}");
        }
    }

    #[test]
    fn test_to_latin1() {
        assert_eq!(to_latin1("Café"), b"Caf\xE9".to_vec());
        assert_eq!(to_latin1("10 €"), b"10 ?".to_vec());
        assert_eq!(to_latin1("你"), b"?".to_vec());
    }

    #[test]
    fn test_charset_encode() {
        assert_eq!(OutputCharset::Utf8.encode("é").as_ref(), "é".as_bytes());
        assert_eq!(OutputCharset::Latin1.encode("é").as_ref(), b"\xE9");
        assert_eq!(
            OutputCharset::Latin1.content_type(),
            "text/plain; charset=iso-8859-1"
        );
    }
}
