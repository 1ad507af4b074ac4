//! Word-level diff between two HTML snapshots.
//!
//! Both snapshots are normalized to plain text first; the diff itself is an
//! LCS-based word diff with grouped add/remove/unchanged runs. Rendering
//! modes (unified, split) are pure derivations over the same part list.

use serde::{Deserialize, Serialize};
use similar::{capture_diff_slices, Algorithm, DiffOp};

use crate::text;

/// One run of consecutive words sharing a change state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffPart {
    pub value: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub added: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub removed: bool,
}

impl DiffPart {
    pub fn unchanged(&self) -> bool {
        !self.added && !self.removed
    }
}

/// Word counts per change category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
    pub unchanged: usize,
    /// `round(100 × (added + removed) / (unchanged + removed))`.
    ///
    /// The denominator is the old baseline only, so a pure expansion reads
    /// as "most of the old text moved" rather than diluting toward zero.
    pub change_percentage: u32,
}

/// Word-level diff of two HTML snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    pub parts: Vec<DiffPart>,
    pub stats: DiffStats,
    /// True when the normalized texts are equal ("no differences").
    pub identical: bool,
}

fn part(words: &[&str], added: bool, removed: bool) -> DiffPart {
    DiffPart {
        value: words.join(" "),
        added,
        removed,
    }
}

/// Compute the word-level diff between two HTML snapshots.
pub fn diff(old_html: &str, new_html: &str) -> DiffResult {
    let old_text = text::strip_tags(old_html);
    let new_text = text::strip_tags(new_html);

    if old_text == new_text {
        let word_count = text::words(&old_text).len();
        let parts = if old_text.is_empty() {
            Vec::new()
        } else {
            vec![part(&text::words(&old_text), false, false)]
        };
        return DiffResult {
            parts,
            stats: DiffStats {
                added: 0,
                removed: 0,
                unchanged: word_count,
                change_percentage: 0,
            },
            identical: true,
        };
    }

    let old_words = text::words(&old_text);
    let new_words = text::words(&new_text);

    let mut parts = Vec::new();
    let mut added = 0;
    let mut removed = 0;
    let mut unchanged = 0;

    for op in capture_diff_slices(Algorithm::Myers, &old_words, &new_words) {
        match op {
            DiffOp::Equal {
                old_index, len, ..
            } => {
                unchanged += len;
                parts.push(part(&old_words[old_index..old_index + len], false, false));
            }
            DiffOp::Delete {
                old_index, old_len, ..
            } => {
                removed += old_len;
                parts.push(part(&old_words[old_index..old_index + old_len], false, true));
            }
            DiffOp::Insert {
                new_index, new_len, ..
            } => {
                added += new_len;
                parts.push(part(&new_words[new_index..new_index + new_len], true, false));
            }
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                removed += old_len;
                added += new_len;
                parts.push(part(&old_words[old_index..old_index + old_len], false, true));
                parts.push(part(&new_words[new_index..new_index + new_len], true, false));
            }
        }
    }

    let baseline = unchanged + removed;
    let change_percentage = if baseline == 0 {
        if added + removed > 0 {
            100
        } else {
            0
        }
    } else {
        (100.0 * (added + removed) as f64 / baseline as f64).round() as u32
    };

    DiffResult {
        parts,
        stats: DiffStats {
            added,
            removed,
            unchanged,
            change_percentage,
        },
        identical: false,
    }
}

/// Unified stream: one sequence with additions and removals inline, each
/// independently toggle-able.
pub fn unified_parts(result: &DiffResult, show_added: bool, show_removed: bool) -> Vec<DiffPart> {
    result
        .parts
        .iter()
        .filter(|p| (show_added || !p.added) && (show_removed || !p.removed))
        .cloned()
        .collect()
}

/// Split streams: the old-side view (no additions) and the new-side view
/// (no removals).
pub fn split_parts(result: &DiffResult) -> (Vec<DiffPart>, Vec<DiffPart>) {
    let old_side = result
        .parts
        .iter()
        .filter(|p| !p.added)
        .cloned()
        .collect();
    let new_side = result
        .parts
        .iter()
        .filter(|p| !p.removed)
        .cloned()
        .collect();
    (old_side, new_side)
}
