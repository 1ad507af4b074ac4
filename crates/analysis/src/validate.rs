//! Revision validation: did the rewrite actually act on each feedback item?
//!
//! The policy is deliberately conservative. `addressed` requires positive
//! textual evidence: the selected text is gone and a comparable passage
//! with measurable change exists in the revision. Anything ambiguous
//! resolves to `partial` or `failed`, never silently to `addressed`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::text;

/// Characters of context taken on each side of the selected text when
/// hunting for the revised counterpart.
const CONTEXT_CHARS: usize = 120;

/// Minimum trigram overlap for a revised window to count as the
/// counterpart of the original passage.
const MIN_OVERLAP: f64 = 0.3;

/// Maximum evidence snippet length, in characters.
const EVIDENCE_CHARS: usize = 160;

/// A feedback item the revision was supposed to act on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackItem {
    pub id: String,
    pub selected_text: String,
    pub category: String,
    pub severity: String,
    pub feedback: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Addressed,
    Partial,
    Failed,
}

/// Per-item verdict with its textual evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemValidation {
    pub id: String,
    pub status: ValidationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Validation of one revision against its feedback items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub items: Vec<ItemValidation>,
    pub addressed_count: usize,
    pub partial_count: usize,
    pub failed_count: usize,
}

impl ValidationResult {
    fn from_items(items: Vec<ItemValidation>) -> Self {
        let addressed_count = items
            .iter()
            .filter(|i| i.status == ValidationStatus::Addressed)
            .count();
        let partial_count = items
            .iter()
            .filter(|i| i.status == ValidationStatus::Partial)
            .count();
        let failed_count = items
            .iter()
            .filter(|i| i.status == ValidationStatus::Failed)
            .count();
        Self {
            items,
            addressed_count,
            partial_count,
            failed_count,
        }
    }
}

/// Classify each feedback item as addressed / partial / failed by comparing
/// the previous and revised content.
pub fn validate_revision(
    previous: &str,
    revised: &str,
    items: &[FeedbackItem],
) -> ValidationResult {
    let prev_text = text::strip_tags(previous);
    let rev_text = text::strip_tags(revised);

    let validations = items
        .iter()
        .map(|item| validate_item(item, &prev_text, &rev_text))
        .collect();

    ValidationResult::from_items(validations)
}

fn validate_item(item: &FeedbackItem, prev_text: &str, rev_text: &str) -> ItemValidation {
    let selected = text::strip_tags(&item.selected_text);

    if selected.is_empty() {
        return ItemValidation {
            id: item.id.clone(),
            status: ValidationStatus::Partial,
            evidence: None,
            warnings: vec!["feedback has no selected text to verify against".to_string()],
        };
    }

    // Selected text survives verbatim: nothing was done about it.
    if rev_text.contains(&selected) {
        return ItemValidation {
            id: item.id.clone(),
            status: ValidationStatus::Failed,
            evidence: None,
            warnings: Vec::new(),
        };
    }

    // Stale snapshot: the selection never matched the previous version
    // either, so there is nothing to compare.
    let Some(position) = prev_text.find(&selected) else {
        tracing::debug!(id = %item.id, "selected text missing from previous version");
        return ItemValidation {
            id: item.id.clone(),
            status: ValidationStatus::Partial,
            evidence: None,
            warnings: vec![
                "selected text not found in the previous version; the comment may refer to a stale snapshot".to_string(),
            ],
        };
    };

    let context = context_window(prev_text, position, selected.len());
    match find_counterpart(&context, rev_text) {
        Some(snippet) => {
            if weak_change(&context, &snippet) {
                ItemValidation {
                    id: item.id.clone(),
                    status: ValidationStatus::Partial,
                    evidence: Some(truncate(&snippet)),
                    warnings: vec![
                        "surrounding passage changed only in punctuation or whitespace".to_string(),
                    ],
                }
            } else {
                ItemValidation {
                    id: item.id.clone(),
                    status: ValidationStatus::Addressed,
                    evidence: Some(truncate(&snippet)),
                    warnings: Vec::new(),
                }
            }
        }
        None => ItemValidation {
            id: item.id.clone(),
            status: ValidationStatus::Partial,
            evidence: None,
            warnings: vec![
                "could not locate a revised counterpart for the selected passage".to_string(),
            ],
        },
    }
}

/// The selection plus up to `CONTEXT_CHARS` on each side, snapped to char
/// boundaries.
fn context_window(prev_text: &str, position: usize, selected_len: usize) -> String {
    let mut start = position.saturating_sub(CONTEXT_CHARS);
    while start > 0 && !prev_text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (position + selected_len + CONTEXT_CHARS).min(prev_text.len());
    while end < prev_text.len() && !prev_text.is_char_boundary(end) {
        end += 1;
    }
    prev_text[start..end].to_string()
}

fn trigrams(words: &[&str]) -> Vec<String> {
    let canon: Vec<String> = words
        .iter()
        .filter_map(|w| text::canonical_word(w))
        .collect();
    canon.windows(3).map(|w| w.join(" ")).collect()
}

/// Slide a window of the context's width over the revised text and return
/// the best-overlapping passage, if any window clears `MIN_OVERLAP`.
fn find_counterpart(context: &str, rev_text: &str) -> Option<String> {
    let context_words = text::words(context);
    let context_grams: HashSet<String> = trigrams(&context_words).into_iter().collect();
    if context_grams.is_empty() {
        return None;
    }

    let rev_words = text::words(rev_text);
    let window = context_words.len().min(rev_words.len().max(1));
    if rev_words.is_empty() {
        return None;
    }

    let mut best: Option<(f64, usize)> = None;
    let last_start = rev_words.len().saturating_sub(window);
    for start in 0..=last_start {
        let slice = &rev_words[start..start + window];
        let hits = trigrams(slice)
            .iter()
            .filter(|g| context_grams.contains(*g))
            .count();
        let overlap = hits as f64 / context_grams.len() as f64;
        if best.map_or(true, |(best_overlap, _)| overlap > best_overlap) {
            best = Some((overlap, start));
        }
    }

    best.filter(|(overlap, _)| *overlap >= MIN_OVERLAP)
        .map(|(_, start)| rev_words[start..start + window].join(" "))
}

/// True when two passages differ only in punctuation, case, or whitespace.
fn weak_change(context: &str, snippet: &str) -> bool {
    let canon = |s: &str| -> Vec<String> {
        text::words(s)
            .iter()
            .filter_map(|w| text::canonical_word(w))
            .collect()
    };
    canon(context) == canon(snippet)
}

fn truncate(snippet: &str) -> String {
    if snippet.chars().count() <= EVIDENCE_CHARS {
        return snippet.to_string();
    }
    let cut: String = snippet.chars().take(EVIDENCE_CHARS).collect();
    format!("{}…", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, selected: &str, feedback: &str) -> FeedbackItem {
        FeedbackItem {
            id: id.to_string(),
            selected_text: selected.to_string(),
            category: "style".to_string(),
            severity: "minor".to_string(),
            feedback: feedback.to_string(),
        }
    }

    #[test]
    fn unchanged_selection_is_failed_never_addressed() {
        let previous = "<p>The program is very good for working adults.</p>";
        let revised = "<p>The program is very good for working adults and others.</p>";
        let items = vec![item("c1", "very good", "remove filler word 'very'")];
        let result = validate_revision(previous, revised, &items);
        assert_eq!(result.items[0].status, ValidationStatus::Failed);
        assert_eq!(result.failed_count, 1);
        assert_eq!(result.addressed_count, 0);
    }

    #[test]
    fn edited_passage_with_real_change_is_addressed_with_evidence() {
        let previous =
            "<p>Online degrees are flexible. The program is very good for working adults. Many students enroll each year.</p>";
        let revised =
            "<p>Online degrees are flexible. The program is a strong fit for working adults. Many students enroll each year.</p>";
        let items = vec![item("c1", "very good", "remove filler word 'very'")];
        let result = validate_revision(previous, revised, &items);
        let verdict = &result.items[0];
        assert_eq!(verdict.status, ValidationStatus::Addressed);
        let evidence = verdict.evidence.as_deref().unwrap();
        assert!(evidence.contains("strong fit"));
        assert_eq!(result.addressed_count, 1);
    }

    #[test]
    fn punctuation_only_change_is_partial() {
        let previous = "<p>Start here. Tuition costs vary widely between schools. End there.</p>";
        let revised = "<p>Start here. Tuition costs vary, widely, between schools! End there.</p>";
        let items = vec![item("c1", "costs vary widely", "tighten this sentence")];
        let result = validate_revision(previous, revised, &items);
        let verdict = &result.items[0];
        assert_eq!(verdict.status, ValidationStatus::Partial);
        assert!(verdict.warnings[0].contains("punctuation"));
    }

    #[test]
    fn stale_selection_is_partial_with_warning() {
        let previous = "<p>Completely different article body.</p>";
        let revised = "<p>Still a different article body.</p>";
        let items = vec![item("c1", "text that never existed", "fix this")];
        let result = validate_revision(previous, revised, &items);
        let verdict = &result.items[0];
        assert_eq!(verdict.status, ValidationStatus::Partial);
        assert!(verdict.warnings[0].contains("stale"));
    }

    #[test]
    fn removed_passage_with_no_counterpart_is_partial() {
        let previous = "<p>Alpha beta gamma delta epsilon zeta eta theta iota kappa.</p>";
        let revised = "<p>Unrelated replacement text with nothing in common whatsoever here.</p>";
        let items = vec![item("c1", "gamma delta epsilon", "cut this")];
        let result = validate_revision(previous, revised, &items);
        assert_eq!(result.items[0].status, ValidationStatus::Partial);
        assert_eq!(result.addressed_count, 0);
    }

    #[test]
    fn empty_selection_is_partial() {
        let items = vec![item("c1", "", "general note")];
        let result = validate_revision("<p>a</p>", "<p>b</p>", &items);
        assert_eq!(result.items[0].status, ValidationStatus::Partial);
        assert!(!result.items[0].warnings.is_empty());
    }

    #[test]
    fn aggregate_counts_match_items() {
        let previous = "<p>One sentence stays put here. The fee is very high for students. Another line remains too.</p>";
        let revised = "<p>One sentence stays put here. The fee is steep for students. Another line remains too.</p>";
        let items = vec![
            item("a", "very high", "drop the intensifier"),
            item("b", "stays put here", "leave as is"),
            item("c", "ghost text", "stale"),
        ];
        let result = validate_revision(previous, revised, &items);
        assert_eq!(result.items.len(), 3);
        assert_eq!(
            result.addressed_count + result.partial_count + result.failed_count,
            3
        );
        assert_eq!(result.items[0].status, ValidationStatus::Addressed);
        assert_eq!(result.items[1].status, ValidationStatus::Failed);
        assert_eq!(result.items[2].status, ValidationStatus::Partial);
    }
}
