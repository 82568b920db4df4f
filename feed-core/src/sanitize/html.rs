//! HTML entity decoding and tag stripping
//!
//! Decoding always shrinks its input, and stripping only grows it by the
//! space it puts between touching tags. Once no tag is left the text stops
//! changing, so repeating both passes terminates.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Named entities for U+00A0..=U+00FF, in code point order
const LATIN1_ENTITIES: [&str; 96] = [
    "nbsp", "iexcl", "cent", "pound", "curren", "yen", "brvbar", "sect", "uml", "copy", "ordf",
    "laquo", "not", "shy", "reg", "macr", "deg", "plusmn", "sup2", "sup3", "acute", "micro",
    "para", "middot", "cedil", "sup1", "ordm", "raquo", "frac14", "frac12", "frac34", "iquest",
    "Agrave", "Aacute", "Acirc", "Atilde", "Auml", "Aring", "AElig", "Ccedil", "Egrave", "Eacute",
    "Ecirc", "Euml", "Igrave", "Iacute", "Icirc", "Iuml", "ETH", "Ntilde", "Ograve", "Oacute",
    "Ocirc", "Otilde", "Ouml", "times", "Oslash", "Ugrave", "Uacute", "Ucirc", "Uuml", "Yacute",
    "THORN", "szlig", "agrave", "aacute", "acirc", "atilde", "auml", "aring", "aelig", "ccedil",
    "egrave", "eacute", "ecirc", "euml", "igrave", "iacute", "icirc", "iuml", "eth", "ntilde",
    "ograve", "oacute", "ocirc", "otilde", "ouml", "divide", "oslash", "ugrave", "uacute", "ucirc",
    "uuml", "yacute", "thorn", "yuml",
];

/// Longest entity body we bother looking for (`&thetasym;` and friends)
const MAX_ENTITY_LEN: usize = 10;

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "euro" => '€',
        "sbquo" => '‚',
        "bdquo" => '„',
        "hellip" => '…',
        "dagger" => '†',
        "Dagger" => '‡',
        "permil" => '‰',
        "lsaquo" => '‹',
        "rsaquo" => '›',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "bull" => '•',
        "ndash" => '–',
        "mdash" => '—',
        "trade" => '™',
        "OElig" => 'Œ',
        "oelig" => 'œ',
        "Scaron" => 'Š',
        "scaron" => 'š',
        "Yuml" => 'Ÿ',
        "fnof" => 'ƒ',
        "circ" => 'ˆ',
        "tilde" => '˜',
        _ => {
            let offset = LATIN1_ENTITIES.iter().position(|&entity| entity == name)?;
            return char::from_u32(0xA0 + offset as u32);
        }
    };
    Some(c)
}

fn numeric_entity(body: &str) -> Option<char> {
    let code = match body.strip_prefix(['x', 'X']) {
        Some(hex) if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
            u32::from_str_radix(hex, 16).ok()?
        }
        Some(_) => return None,
        None if !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit()) => {
            body.parse().ok()?
        }
        None => return None,
    };
    char::from_u32(code).filter(|&c| c != '\0')
}

/// Decode HTML entities (named, `&#NNN;` and `&#xHH;`)
///
/// Unknown or malformed entities are left untouched.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        result.push_str(&rest[..amp]);
        let candidate = &rest[amp + 1..];

        let decoded = candidate
            .char_indices()
            .take(MAX_ENTITY_LEN + 1)
            .find(|&(_, c)| c == ';')
            .and_then(|(semi, _)| {
                let body = &candidate[..semi];
                let c = match body.strip_prefix('#') {
                    Some(numeric) => numeric_entity(numeric),
                    None => named_entity(body),
                }?;
                Some((c, semi))
            });

        match decoded {
            Some((c, semi)) => {
                result.push(c);
                rest = &candidate[semi + 1..];
            }
            None => {
                result.push('&');
                rest = candidate;
            }
        }
    }
    result.push_str(rest);

    Cow::Owned(result)
}

/// `<br>`, `<br/>`, `<BR />`
static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));

/// A tag opens with a letter, `/`, `!` or `?`; a lone `<` is text
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[A-Za-z/!?][^>]*>").expect("valid regex"));

/// Remove markup tags
///
/// `<br>` variants become a space, and a space separates two tags that
/// touch (`</td><td>`), so stripping never glues words together. A `<`
/// that does not open a tag, or whose tag never closes, is kept as text.
pub fn strip_tags(text: &str) -> Cow<'_, str> {
    if !text.contains('<') {
        return Cow::Borrowed(text);
    }

    let text = LINE_BREAK.replace_all(text, " ");
    let text = text.replace("><", "> <");
    Cow::Owned(TAG.replace_all(&text, "").into_owned())
}

/// Decode entities and strip tags until the text stops changing
pub fn strip_html(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let decoded = decode_entities(&current);
        let stripped = strip_tags(&decoded).into_owned();
        if stripped == current {
            return current;
        }
        current = stripped;
    }
}
