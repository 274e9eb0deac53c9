//! Funding link detection and grouping
//!
//! Handles:
//! - Label normalization (punctuation and whitespace stripped, lowercased)
//! - URL canonicalization (query string and fragment dropped)
//! - Deciding whether a label names a funding link
//! - Grouping matched links by canonical URL across packages

use std::collections::{BTreeMap, BTreeSet};

/// Normalized labels that always count as funding links
pub const FUNDING_ALIASES: [&str; 4] = ["funding", "sponsor", "donate", "donation"];

/// Label used for project URLs that were declared without one
pub const GENERIC_LABEL: &str = "Generic Link";

/// Normalize a Project-URL label for comparison
///
/// Removes every character that is not an ASCII letter or digit and lowercases
/// the remainder, so "Sponsor this project!" becomes "sponsorthisproject".
pub fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Strip the query string and fragment from a URL
///
/// The scheme is lowercased; host and path are kept as written. Input that
/// does not look like a URL is returned with only the same stripping applied.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    let url = url.split_once('#').map_or(url, |(head, _)| head);
    let url = url.split_once('?').map_or(url, |(head, _)| head);

    match url.split_once("://") {
        Some((scheme, rest)) if is_scheme(scheme) => {
            format!("{}://{}", scheme.to_ascii_lowercase(), rest)
        }
        _ => url.to_string(),
    }
}

/// RFC 3986 scheme: a letter followed by letters, digits, `+`, `-` or `.`
fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Decides whether a normalized label refers to a funding link
#[derive(Debug, Clone)]
pub struct FundingMatcher {
    aliases: BTreeSet<String>,
}

impl Default for FundingMatcher {
    fn default() -> Self {
        Self {
            aliases: FUNDING_ALIASES.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl FundingMatcher {
    /// Matcher with additional aliases on top of the built-in ones
    ///
    /// Extra aliases are normalized the same way labels are; empty ones are ignored.
    pub fn with_extra_aliases<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut matcher = Self::default();
        for alias in extra {
            let alias = normalize_label(alias.as_ref());
            if !alias.is_empty() {
                matcher.aliases.insert(alias);
            }
        }
        matcher
    }

    /// True if the label equals an alias or mentions "fund" or "sponsor"
    ///
    /// Substring matching also accepts labels like "Fundamentals".
    pub fn is_funding(&self, normalized: &str) -> bool {
        if normalized.is_empty() {
            return false;
        }
        self.aliases.contains(normalized)
            || normalized.contains("fund")
            || normalized.contains("sponsor")
    }

    /// Match a raw project URL entry, returning the label to report it under
    ///
    /// Labelled entries are matched on their label. Unlabelled entries are
    /// matched on the URL text itself and reported as [`GENERIC_LABEL`].
    pub fn match_link(&self, label: Option<&str>, url: &str) -> Option<String> {
        match label {
            Some(label) => self
                .is_funding(&normalize_label(label))
                .then(|| label.to_string()),
            None => {
                let lower = url.to_lowercase();
                (lower.contains("fund") || lower.contains("sponsor"))
                    .then(|| GENERIC_LABEL.to_string())
            }
        }
    }
}

/// A funding URL together with every package that declares it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundingEntry {
    pub url: String,
    pub label: String,
    pub packages: BTreeSet<String>,
}

/// Groups matched funding links by canonical URL
#[derive(Debug, Default)]
pub struct Aggregator {
    entries: BTreeMap<String, FundingEntry>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `package` declares `url` under `label`
    ///
    /// The first label seen for a canonical URL is kept.
    pub fn add(&mut self, package: &str, label: &str, url: &str) {
        let canonical = normalize_url(url);
        if canonical.is_empty() {
            return;
        }
        self.entries
            .entry(canonical.clone())
            .or_insert_with(|| FundingEntry {
                url: canonical,
                label: label.to_string(),
                packages: BTreeSet::new(),
            })
            .packages
            .insert(package.to_string());
    }

    /// Whether any link has been recorded for `package`
    pub fn has_package(&self, package: &str) -> bool {
        self.entries
            .values()
            .any(|entry| entry.packages.contains(package))
    }

    /// Finish aggregation, yielding entries sorted by canonical URL
    pub fn finish(self) -> Vec<FundingEntry> {
        self.entries.into_values().collect()
    }
}
