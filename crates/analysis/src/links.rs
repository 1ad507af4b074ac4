//! Link classification for editorial compliance.
//!
//! Anchors are extracted from article HTML and tagged internal / external /
//! fragment, then external hosts are checked against the blocked-domain and
//! approved-source lists. Blocking issues stop publication; warnings are
//! advisory.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::text;

/// Link policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkConfig {
    /// The site's own domain; absolute links to it count as internal.
    pub site_domain: String,
    pub min_internal_links: usize,
    pub min_external_links: usize,
    /// Competitor / disallowed domains. Any match is blocking.
    pub blocked_domains: Vec<String>,
    /// Approved external sources (statistical, government, nonprofit).
    /// External hosts not on this list produce a warning.
    pub allowed_external_domains: Vec<String>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            site_domain: "geteducated.com".to_string(),
            min_internal_links: 3,
            min_external_links: 1,
            blocked_domains: vec!["onlineu.com".to_string()],
            allowed_external_domains: vec![
                "bls.gov".to_string(),
                "ed.gov".to_string(),
                "nces.ed.gov".to_string(),
                "census.gov".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Internal,
    External,
    /// Same-page fragment link (`#...`); counted in the total but not as
    /// an internal link.
    Anchor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkSeverity {
    None,
    Warning,
    Blocking,
}

/// One classified anchor from the article body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    pub url: String,
    pub anchor_text: String,
    #[serde(rename = "type")]
    pub kind: LinkKind,
    pub severity: LinkSeverity,
    pub issues: Vec<String>,
}

/// Full link analysis for one HTML snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkReport {
    pub links: Vec<LinkRecord>,
    pub internal_links: usize,
    pub external_links: usize,
    pub total_links: usize,
    pub blocking_issues: Vec<String>,
    pub warnings: Vec<String>,
    pub compliant: bool,
}

fn anchor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*["']([^"']*)["'][^>]*>(.*?)</a>"#).unwrap()
    })
}

/// True when `host` is `domain` or a subdomain of it.
fn host_matches(host: &str, domain: &str) -> bool {
    host == domain || host.ends_with(&format!(".{domain}"))
}

fn classify(href: &str, config: &LinkConfig) -> LinkKind {
    if href.starts_with('#') {
        return LinkKind::Anchor;
    }
    match Url::parse(href) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) if host_matches(host, &config.site_domain) => LinkKind::Internal,
            Some(_) => LinkKind::External,
            // Scheme without a host (mailto: etc.) counts as external
            None => LinkKind::External,
        },
        // Relative path: same-site
        Err(_) => LinkKind::Internal,
    }
}

fn external_issues(href: &str, config: &LinkConfig) -> (LinkSeverity, Vec<String>) {
    let host = match Url::parse(href).ok().and_then(|u| u.host_str().map(str::to_string)) {
        Some(host) => host,
        None => return (LinkSeverity::None, Vec::new()),
    };

    if let Some(blocked) = config
        .blocked_domains
        .iter()
        .find(|d| host_matches(&host, d))
    {
        return (
            LinkSeverity::Blocking,
            vec![format!("Links to disallowed domain {blocked}")],
        );
    }

    // Editorial policy: school links go through internal program pages,
    // never raw .edu URLs.
    if host_matches(&host, "edu") {
        return (
            LinkSeverity::Blocking,
            vec![format!(
                "Direct .edu link to {host}; link the internal program page instead"
            )],
        );
    }

    if !config
        .allowed_external_domains
        .iter()
        .any(|d| host_matches(&host, d))
    {
        return (
            LinkSeverity::Warning,
            vec![format!("External domain {host} is not on the approved source list")],
        );
    }

    (LinkSeverity::None, Vec::new())
}

/// Extract and classify every anchor in `html` against the link policy.
///
/// Pure function of content + config; malformed anchors simply do not match
/// and are not counted.
pub fn analyze_links(html: &str, config: &LinkConfig) -> LinkReport {
    let mut links = Vec::new();
    let mut internal_links = 0;
    let mut external_links = 0;
    let mut blocking_issues = Vec::new();
    let mut warnings = Vec::new();

    for captures in anchor_re().captures_iter(html) {
        let href = captures[1].trim().to_string();
        let anchor_text = text::strip_tags(&captures[2]);
        let kind = classify(&href, config);

        let (severity, issues) = match kind {
            LinkKind::External => {
                external_links += 1;
                external_issues(&href, config)
            }
            LinkKind::Internal => {
                internal_links += 1;
                (LinkSeverity::None, Vec::new())
            }
            LinkKind::Anchor => (LinkSeverity::None, Vec::new()),
        };

        match severity {
            LinkSeverity::Blocking => blocking_issues.extend(issues.iter().cloned()),
            LinkSeverity::Warning => warnings.extend(issues.iter().cloned()),
            LinkSeverity::None => {}
        }

        links.push(LinkRecord {
            url: href,
            anchor_text,
            kind,
            severity,
            issues,
        });
    }

    let compliant = blocking_issues.is_empty()
        && internal_links >= config.min_internal_links
        && external_links >= config.min_external_links;

    LinkReport {
        total_links: links.len(),
        links,
        internal_links,
        external_links,
        blocking_issues,
        warnings,
        compliant,
    }
}
