use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Entities YouTube emits in caption text
const ENTITIES: &[(&str, &str)] = &[
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
    ("&#x27;", "'"),
    ("&#x2F;", "/"),
    ("&#x2f;", "/"),
    ("&#47;", "/"),
    ("&#xa0;", " "),
    ("&nbsp;", " "),
];

static ENTITY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"&[^;]+;").unwrap());

// Caption whitespace also covers U+FEFF, which `\s` alone does not match.
static MULTI_DOT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\x{FEFF}]*\.[\s\x{FEFF}]*\.[\s\x{FEFF}]*").unwrap());
static DOT_SPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\x{FEFF}]*\.[\s\x{FEFF}]+").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\x{FEFF}]+").unwrap());
static SPACE_BEFORE_PUNCT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\x{FEFF}]+([,.])").unwrap());
static QUESTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\x{FEFF}]*\?[\s\x{FEFF}]*").unwrap());
static EXCLAMATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\x{FEFF}]*![\s\x{FEFF}]*").unwrap());

fn is_caption_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

/// Trim whitespace, including byte order marks, from both ends
pub fn trim_caption(text: &str) -> &str {
    text.trim_matches(is_caption_whitespace)
}

/// Decode the HTML entities found in caption text and trim the result.
///
/// Unknown entities are left untouched. Decoding is a single pass, so
/// `&amp;lt;` becomes `&lt;` rather than `<`.
pub fn decode_entities(text: &str) -> String {
    let decoded = ENTITY_RE.replace_all(text, |caps: &Captures| {
        let token = &caps[0];
        ENTITIES
            .iter()
            .find(|(entity, _)| *entity == token)
            .map(|(_, literal)| (*literal).to_string())
            .unwrap_or_else(|| token.to_string())
    });
    trim_caption(&decoded).to_string()
}

/// Repair punctuation and whitespace in caption text.
///
/// Rules run in a fixed order; each one relies on the output of the previous.
pub fn normalize_text(text: &str) -> String {
    let text = text.replace('\n', " ");
    let text = MULTI_DOT_RE.replace_all(&text, ". ");
    let text = DOT_SPACE_RE.replace_all(&text, ". ");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    let text = SPACE_BEFORE_PUNCT_RE.replace_all(&text, "${1}");
    let text = QUESTION_RE.replace_all(&text, "? ");
    let text = EXCLAMATION_RE.replace_all(&text, "! ");
    trim_caption(&text).to_string()
}
