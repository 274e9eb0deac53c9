//! Package metadata sources
//!
//! A source turns a package name into the project URLs it declares. Local
//! installed metadata and the PyPI registry both implement [`MetadataSource`].

use crate::funding::FundingMatcher;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Package '{package}' not found")]
    NotFound { package: String },

    #[error("Network error while fetching '{package}': {message}")]
    Network { package: String, message: String },

    #[error("Failed to read metadata for '{package}': {message}")]
    Read { package: String, message: String },

    #[error("Failed to parse metadata for '{package}': {message}")]
    Parse { package: String, message: String },

    #[error("No Python interpreter found to locate site-packages (tried {tried})")]
    NoInterpreter { tried: String },
}

/// A single Project-URL entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectUrl {
    /// `None` when the metadata entry had no `Label, ` prefix
    pub label: Option<String>,
    pub url: String,
}

impl ProjectUrl {
    pub fn labelled(label: &str, url: &str) -> Self {
        Self {
            label: Some(label.to_string()),
            url: url.to_string(),
        }
    }

    /// Parse a core metadata `Project-URL` value of the form `Label, URL`
    pub fn parse(value: &str) -> Self {
        match value.split_once(',') {
            Some((label, url)) => Self {
                label: Some(label.trim().to_string()),
                url: url.trim().to_string(),
            },
            None => Self {
                label: None,
                url: value.trim().to_string(),
            },
        }
    }
}

/// Metadata declared by one package, as read from a single source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageMetadata {
    pub name: String,
    pub home_page: Option<String>,
    pub project_urls: Vec<ProjectUrl>,
}

impl PackageMetadata {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Funding-related links as `(label, url)` pairs, in declaration order
    pub fn funding_links(&self, matcher: &FundingMatcher) -> Vec<(String, String)> {
        self.project_urls
            .iter()
            .filter(|entry| !entry.url.is_empty())
            .filter_map(|entry| {
                matcher
                    .match_link(entry.label.as_deref(), &entry.url)
                    .map(|label| (label, entry.url.clone()))
            })
            .collect()
    }
}

/// Something that can look up a package's declared project URLs
pub trait MetadataSource {
    /// Short name used in log messages
    fn name(&self) -> &'static str;

    fn fetch(&self, package: &str) -> Result<PackageMetadata, SourceError>;
}

/// Normalize a Python package name (PEP 503)
///
/// Lowercases and collapses runs of `-`, `_` and `.` into a single `-`,
/// including leading and trailing runs.
pub fn normalize_package_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.trim().chars() {
        if matches!(c, '-' | '_' | '.') {
            pending_sep = true;
            continue;
        }
        if pending_sep {
            out.push('-');
        }
        pending_sep = false;
        out.push(c.to_ascii_lowercase());
    }
    if pending_sep {
        out.push('-');
    }
    out
}
