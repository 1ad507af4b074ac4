//! HTML-to-text normalization shared by the analysis engines.
//!
//! Editorial content is messy authored HTML, not a security boundary, so a
//! regex strip is acceptable here. Callers that need real DOM semantics can
//! substitute a parser behind the engine interfaces without touching call
//! sites.

use std::sync::OnceLock;

use regex::Regex;

fn script_style_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)>").unwrap()
    })
}

fn comment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").unwrap())
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").unwrap())
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Strip an HTML fragment down to normalized plain text.
///
/// `<script>`/`<style>` blocks and comments are removed entirely, remaining
/// tags become single spaces, the five common entities are decoded, and
/// whitespace runs collapse to one space. Malformed markup degrades (an
/// unclosed tag is dropped to the end of the nearest `>`), it never errors.
pub fn strip_tags(html: &str) -> String {
    let no_scripts = script_style_re().replace_all(html, " ");
    let no_comments = comment_re().replace_all(&no_scripts, " ");
    let no_tags = tag_re().replace_all(&no_comments, " ");

    let decoded = no_tags
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    whitespace_re().replace_all(&decoded, " ").trim().to_string()
}

/// Split normalized text into words (maximal runs of non-whitespace).
pub fn words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Word count of an HTML fragment after normalization.
pub fn word_count(html: &str) -> usize {
    words(&strip_tags(html)).len()
}

/// Lowercase a word and drop non-alphanumeric characters, for fuzzy
/// word-level comparisons. Returns `None` for words that are all punctuation.
pub fn canonical_word(word: &str) -> Option<String> {
    let canon: String = word
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect();
    if canon.is_empty() {
        None
    } else {
        Some(canon)
    }
}
