use aho_corasick::{AhoCorasick, MatchKind};
use once_cell::sync::Lazy;

// Built once; shared by every text and attribute write.
static XML_ESCAPER: Lazy<Option<AhoCorasick>> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "'"])
        .ok()
});

// LeftmostLongest so that `&amp;lt;` decodes to `&lt;` and not `<`.
static XML_UNESCAPER: Lazy<Option<AhoCorasick>> = Lazy::new(|| {
    AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"])
        .ok()
});

/// Escape XML special characters for use in text content or attribute values.
///
/// # Examples
///
/// ```
/// use deckfill::common::xml::escape_xml;
/// assert_eq!(escape_xml("R&D"), "R&amp;D");
/// assert_eq!(escape_xml("<b>\"q\"</b>"), "&lt;b&gt;&quot;q&quot;&lt;/b&gt;");
/// ```
#[inline]
pub fn escape_xml(s: &str) -> String {
    match XML_ESCAPER.as_ref() {
        Some(ac) => ac.replace_all(s, &["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"]),
        None => escape_slow(s),
    }
}

/// Unescape the five predefined entities and numeric character references.
///
/// Unknown or malformed references are left unchanged.
///
/// # Examples
///
/// ```
/// use deckfill::common::xml::unescape_xml;
/// assert_eq!(unescape_xml("&lt;a &amp; b&gt;"), "<a & b>");
/// assert_eq!(unescape_xml("&#8364;5 &#x41;"), "\u{20ac}5 A");
/// assert_eq!(unescape_xml("&amp;lt;"), "&lt;");
/// assert_eq!(unescape_xml("&invalid;"), "&invalid;");
/// ```
pub fn unescape_xml(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    if let Some(ac) = XML_UNESCAPER.as_ref()
        && !s.contains("&#")
    {
        return ac.replace_all(s, &["&", "<", ">", "\"", "'"]);
    }
    unescape_slow(s)
}

fn escape_slow(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Single left-to-right pass that also decodes `&#NNN;` and `&#xHH;`.
fn unescape_slow(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let Some(end) = tail.find(';') else {
            out.push_str(tail);
            return out;
        };
        let entity = &tail[1..end];
        match decode_entity(entity) {
            Some(c) => {
                out.push(c);
                rest = &tail[end + 1..];
            },
            None => {
                out.push('&');
                rest = &tail[1..];
            },
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let num = entity.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        },
    }
}
