//! Text normalization applied to extracted documents before chunking.

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

struct Patterns {
    url: Regex,
    email: Regex,
    tag: Regex,
    whitespace: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        url: Regex::new(r"https?://\S+|www\.\S+").expect("valid url regex"),
        email: Regex::new(r"\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b").expect("valid email regex"),
        tag: Regex::new(r"<.*?>").expect("valid tag regex"),
        whitespace: Regex::new(r"\s+").expect("valid whitespace regex"),
    })
}

/// Normalize extracted text for embedding.
///
/// Applies NFKC compatibility normalization and lowercases, strips URLs,
/// e-mail addresses and angle-bracket markup, then collapses every
/// whitespace run into a single space.
#[must_use]
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let p = patterns();
    let lowered = text.nfkc().collect::<String>().to_lowercase();
    let no_urls = p.url.replace_all(&lowered, "");
    let no_emails = p.email.replace_all(&no_urls, "");
    let no_tags = p.tag.replace_all(&no_emails, "");
    let collapsed = p.whitespace.replace_all(&no_tags, " ");
    collapsed.trim().to_string()
}

/// Lowercase file extension without the dot, or `""` when there is none.
#[must_use]
pub fn detect_file_type(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clean_text_strips_noise() {
        let raw = "Read   THE docs at https://example.com/a?b=1 or www.example.org\n\n\
                   Contact: Jane.Doe@Example.COM <b>now</b>";
        assert_eq!(clean_text(raw), "read the docs at or contact: now");
    }

    #[test]
    fn clean_text_handles_empty_and_blank() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text(" \n\t "), "");
    }

    #[test]
    fn clean_text_removes_image_markers() {
        let raw = "page one\n\n<IMAGE_TEXT>Figure 1</IMAGE_TEXT>";
        assert_eq!(clean_text(raw), "page one figure 1");
    }

    #[test]
    fn clean_text_folds_compatibility_forms() {
        assert_eq!(clean_text("\u{FB01}le \u{FF26}\u{FF55}\u{FF4C}\u{FF4C}"), "file full");
        assert_eq!(clean_text("caf\u{0065}\u{0301}"), "caf\u{00e9}");
    }

    #[test]
    fn detect_file_type_lowercases_extension() {
        assert_eq!(detect_file_type("Notes.TXT"), "txt");
        assert_eq!(detect_file_type("archive.tar.gz"), "gz");
        assert_eq!(detect_file_type("README"), "");
        assert_eq!(detect_file_type(""), "");
    }
}
