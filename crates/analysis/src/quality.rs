//! Publish-readiness quality checks.
//!
//! Each named metric produces one [`QualityCheck`]; the snapshot aggregates
//! a 0-100 score and the binary publish gate. Only internal-link count and
//! link compliance are critical; advisory checks like word count and
//! readability affect the score but never the gate.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::links::{analyze_links, LinkConfig, LinkReport};
use crate::text;

/// Named thresholds for the quality checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityConfig {
    pub min_word_count: usize,
    pub max_word_count: usize,
    pub min_heading_count: usize,
    pub min_images: usize,
    /// Keyword density band, in percent of total words.
    pub keyword_density_min: f64,
    pub keyword_density_max: f64,
    /// Flesch Reading Ease band.
    pub readability_min: f64,
    pub readability_max: f64,
    pub require_headings: bool,
    pub require_alt_text: bool,
    pub require_bls_citation: bool,
    pub require_faq_schema: bool,
    pub links: LinkConfig,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_word_count: 800,
            max_word_count: 3000,
            min_heading_count: 3,
            min_images: 1,
            keyword_density_min: 0.5,
            keyword_density_max: 2.5,
            readability_min: 30.0,
            readability_max: 70.0,
            require_headings: true,
            require_alt_text: true,
            require_bls_citation: true,
            require_faq_schema: true,
            links: LinkConfig::default(),
        }
    }
}

/// Article metadata the checks draw on beyond the HTML body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleMeta {
    pub target_keyword: Option<String>,
    pub faq_count: usize,
}

/// Result of a single named metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityCheck {
    pub label: String,
    pub passed: bool,
    /// Failing a critical check blocks publication outright.
    pub critical: bool,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
}

/// Aggregated quality snapshot for one content state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualitySnapshot {
    /// `round(100 × passed / enabled)`.
    pub score: u32,
    /// True iff no critical check is failing.
    pub can_publish: bool,
    pub checks: Vec<QualityCheck>,
}

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<h[23][\s>]").unwrap())
}

fn img_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<img\b[^>]*>").unwrap())
}

fn alt_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)alt\s*=\s*["']([^"']+)["']"#).unwrap())
}

/// Flesch Reading Ease approximation over plain text.
///
/// Sentences split on `.`, `!`, `?`; syllables approximated as vowel-cluster
/// matches per word, minimum one per word.
pub fn flesch_reading_ease(plain_text: &str) -> f64 {
    let words = text::words(plain_text);
    if words.is_empty() {
        return 0.0;
    }

    let sentences = plain_text
        .split(['.', '!', '?'])
        .filter(|s| s.chars().any(char::is_alphanumeric))
        .count()
        .max(1);

    let syllables: usize = words.iter().map(|w| syllables_in(w)).sum();

    let words_per_sentence = words.len() as f64 / sentences as f64;
    let syllables_per_word = syllables as f64 / words.len() as f64;

    206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word
}

fn syllables_in(word: &str) -> usize {
    let mut count = 0;
    let mut in_cluster = false;
    for c in word.chars() {
        let is_vowel = matches!(
            c.to_ascii_lowercase(),
            'a' | 'e' | 'i' | 'o' | 'u' | 'y'
        );
        if is_vowel && !in_cluster {
            count += 1;
        }
        in_cluster = is_vowel;
    }
    count.max(1)
}

/// Case-insensitive literal substring occurrence count.
fn occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    let haystack = haystack.to_lowercase();
    let needle = needle.to_lowercase();
    haystack.matches(&needle).count()
}

/// Evaluate every enabled quality check against one content snapshot.
///
/// Checks whose requirement flag is off, or that have no applicable target
/// (keyword density without a target keyword), are excluded from both the
/// score and the gate. Pure function; the caller owns reacting to the
/// snapshot.
pub fn evaluate_quality(
    content: &str,
    meta: &ArticleMeta,
    config: &QualityConfig,
) -> QualitySnapshot {
    let plain = text::strip_tags(content);
    let word_count = text::words(&plain).len();
    let link_report = analyze_links(content, &config.links);

    let mut checks = Vec::new();

    checks.push(word_count_check(word_count, config));

    if config.require_headings {
        checks.push(heading_check(content, config));
    }

    if config.min_images > 0 || config.require_alt_text {
        checks.push(image_check(content, config));
    }

    if let Some(keyword) = meta.target_keyword.as_deref().filter(|k| !k.trim().is_empty()) {
        checks.push(keyword_density_check(&plain, word_count, keyword, config));
    }

    checks.push(readability_check(&plain, config));

    if config.require_bls_citation {
        checks.push(citation_check(content));
    }

    if config.require_faq_schema {
        checks.push(faq_check(meta));
    }

    checks.push(internal_link_check(&link_report, config));
    checks.push(external_link_check(&link_report, config));
    checks.push(link_compliance_check(&link_report));

    let passed = checks.iter().filter(|c| c.passed).count();
    let score = ((100.0 * passed as f64 / checks.len() as f64).round()) as u32;
    let can_publish = checks.iter().all(|c| c.passed || !c.critical);

    QualitySnapshot {
        score,
        can_publish,
        checks,
    }
}

fn word_count_check(word_count: usize, config: &QualityConfig) -> QualityCheck {
    let passed = word_count >= config.min_word_count && word_count <= config.max_word_count;
    let issue = if word_count < config.min_word_count {
        Some(format!(
            "Add {} more word(s) to reach the {}-word minimum",
            config.min_word_count - word_count,
            config.min_word_count
        ))
    } else if word_count > config.max_word_count {
        Some(format!(
            "Trim {} word(s) to fit the {}-word maximum",
            word_count - config.max_word_count,
            config.max_word_count
        ))
    } else {
        None
    };
    QualityCheck {
        label: "Word count".to_string(),
        passed,
        critical: false,
        value: word_count.to_string(),
        issue,
    }
}

fn heading_check(content: &str, config: &QualityConfig) -> QualityCheck {
    let count = heading_re().find_iter(content).count();
    let passed = count >= config.min_heading_count;
    QualityCheck {
        label: "Headings".to_string(),
        passed,
        critical: false,
        value: count.to_string(),
        issue: (!passed).then(|| {
            format!(
                "Add {} more H2/H3 heading(s)",
                config.min_heading_count - count
            )
        }),
    }
}

fn image_check(content: &str, config: &QualityConfig) -> QualityCheck {
    let image_count = img_re().find_iter(content).count();
    let with_alt = img_re()
        .find_iter(content)
        .filter(|m| alt_re().is_match(m.as_str()))
        .count();

    let enough = image_count >= config.min_images;
    let alt_ok = !config.require_alt_text || with_alt == image_count;
    let passed = enough && alt_ok;

    let issue = if !enough {
        Some(format!(
            "Add {} more image(s)",
            config.min_images - image_count
        ))
    } else if !alt_ok {
        Some(format!(
            "{} image(s) missing alt text",
            image_count - with_alt
        ))
    } else {
        None
    };

    QualityCheck {
        label: "Images & alt text".to_string(),
        passed,
        critical: false,
        value: format!("{with_alt}/{image_count} with alt"),
        issue,
    }
}

fn keyword_density_check(
    plain: &str,
    word_count: usize,
    keyword: &str,
    config: &QualityConfig,
) -> QualityCheck {
    let count = occurrences(plain, keyword);
    let density = if word_count == 0 {
        0.0
    } else {
        100.0 * count as f64 / word_count as f64
    };
    let passed = density >= config.keyword_density_min && density <= config.keyword_density_max;
    let issue = if density < config.keyword_density_min {
        Some(format!(
            "Keyword density {density:.1}% is thin (minimum {:.1}%)",
            config.keyword_density_min
        ))
    } else if density > config.keyword_density_max {
        Some(format!(
            "Keyword density {density:.1}% looks like stuffing (maximum {:.1}%)",
            config.keyword_density_max
        ))
    } else {
        None
    };
    QualityCheck {
        label: "Keyword density".to_string(),
        passed,
        critical: false,
        value: format!("{density:.1}%"),
        issue,
    }
}

fn readability_check(plain: &str, config: &QualityConfig) -> QualityCheck {
    let score = flesch_reading_ease(plain);
    let passed = score >= config.readability_min && score <= config.readability_max;
    QualityCheck {
        label: "Readability".to_string(),
        passed,
        critical: false,
        value: format!("{score:.0}"),
        issue: (!passed).then(|| {
            format!(
                "Flesch score {score:.0} outside the {:.0}–{:.0} target band",
                config.readability_min, config.readability_max
            )
        }),
    }
}

fn citation_check(content: &str) -> QualityCheck {
    let lower = content.to_lowercase();
    let passed = lower.contains("bls.gov") || lower.contains("bureau of labor statistics");
    QualityCheck {
        label: "BLS citation".to_string(),
        passed,
        critical: false,
        value: if passed { "present" } else { "missing" }.to_string(),
        issue: (!passed).then(|| "Cite Bureau of Labor Statistics data".to_string()),
    }
}

fn faq_check(meta: &ArticleMeta) -> QualityCheck {
    let passed = meta.faq_count > 0;
    QualityCheck {
        label: "FAQ schema".to_string(),
        passed,
        critical: false,
        value: meta.faq_count.to_string(),
        issue: (!passed).then(|| "Add at least one FAQ entry".to_string()),
    }
}

fn internal_link_check(report: &LinkReport, config: &QualityConfig) -> QualityCheck {
    let passed = report.internal_links >= config.links.min_internal_links;
    QualityCheck {
        label: "Internal links".to_string(),
        passed,
        critical: true,
        value: report.internal_links.to_string(),
        issue: (!passed).then(|| {
            format!(
                "Add {} more internal link(s)",
                config.links.min_internal_links - report.internal_links
            )
        }),
    }
}

fn external_link_check(report: &LinkReport, config: &QualityConfig) -> QualityCheck {
    let passed = report.external_links >= config.links.min_external_links;
    QualityCheck {
        label: "External links".to_string(),
        passed,
        critical: false,
        value: report.external_links.to_string(),
        issue: (!passed).then(|| {
            format!(
                "Add {} more external link(s)",
                config.links.min_external_links - report.external_links
            )
        }),
    }
}

fn link_compliance_check(report: &LinkReport) -> QualityCheck {
    let passed = report.blocking_issues.is_empty();
    QualityCheck {
        label: "Link compliance".to_string(),
        passed,
        critical: true,
        value: format!("{} blocking issue(s)", report.blocking_issues.len()),
        issue: (!passed).then(|| report.blocking_issues.join("; ")),
    }
}
