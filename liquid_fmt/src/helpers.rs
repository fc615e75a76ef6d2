use aho_corasick::AhoCorasick;
use std::sync::LazyLock;

static VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr", "param",
];

pub(crate) fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS
        .iter()
        .any(|tag| tag.eq_ignore_ascii_case(name))
}

/// Standard HTML tags get lowercased, everything else keeps its case.
pub(crate) fn is_html_tag(name: &str) -> bool {
    css_dataset::tags::STANDARD_HTML_TAGS
        .iter()
        .any(|tag| tag.eq_ignore_ascii_case(name))
}

pub(crate) fn is_whitespace_at(source: &str, index: usize) -> bool {
    source
        .as_bytes()
        .get(index)
        .is_some_and(u8::is_ascii_whitespace)
}

pub(crate) fn count_line_breaks(s: &str) -> usize {
    memchr::memchr_iter(b'\n', s.as_bytes()).count()
}

/// Identifier-like strings can be looked up with a dot instead of brackets.
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && s.strip_suffix('?')
            .unwrap_or(s)
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub(crate) static UNESCAPING_AC: LazyLock<AhoCorasick> =
    LazyLock::new(|| AhoCorasick::new(["&quot;", "&#x22;", "&#x27;"]).unwrap());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn void_elements_ignore_case() {
        assert!(is_void_element("br"));
        assert!(is_void_element("IMG"));
        assert!(!is_void_element("div"));
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("title"));
        assert!(!is_identifier("first-name"));
        assert!(!is_identifier("a?b"));
        assert!(is_identifier("empty?"));
        assert!(!is_identifier("1st"));
        assert!(!is_identifier("with space"));
        assert!(!is_identifier(""));
    }
}
