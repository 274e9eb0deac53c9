//! GitHub FUNDING.yml lookups
//!
//! Handles:
//! - Finding a `github.com/<owner>/<repo>` reference in package metadata
//! - Fetching `.github/FUNDING.yml` through the contents API
//! - Expanding FUNDING.yml platform entries into sponsor URLs
//!
//! Every failure degrades to "no funding found".

use crate::funding::normalize_label;
use crate::http::USER_AGENT;
use crate::source::PackageMetadata;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("{repo} has no .github/FUNDING.yml")]
    NotFound { repo: String },

    #[error("GitHub refused access to {repo} (HTTP {status})")]
    Unauthorized { repo: String, status: u16 },

    #[error("Failed to fetch FUNDING.yml for {repo}: {message}")]
    Fetch { repo: String, message: String },

    #[error("Failed to parse FUNDING.yml for {repo}: {message}")]
    Parse { repo: String, message: String },
}

/// A GitHub repository reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl RepoRef {
    /// Extract `owner/repo` from an `http(s)://github.com/owner/repo...` URL
    pub fn from_url(url: &str) -> Option<Self> {
        let url = url.trim();
        let rest = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))?;
        let path = rest.strip_prefix("github.com/")?;

        let mut segments = path.splitn(2, '/');
        let owner = leading_name(segments.next()?)?;
        let repo = leading_name(segments.next()?)?;
        let repo = repo.strip_suffix(".git").unwrap_or(repo);
        if repo.is_empty() {
            return None;
        }

        Some(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

/// The longest prefix made of characters valid in GitHub owner/repo names
fn leading_name(segment: &str) -> Option<&str> {
    let end = segment
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')))
        .unwrap_or(segment.len());
    let name = &segment[..end];
    (!name.is_empty()).then_some(name)
}

/// Normalized project URL labels that usually point at the source repository
const REPO_LABELS: [&str; 5] = ["source", "sourcecode", "homepage", "code", "repository"];

/// Find the GitHub repository a package is developed in
///
/// Checks `Home-page` first, then project URLs labelled as source/homepage
/// or carrying no label.
pub fn find_repo(meta: &PackageMetadata) -> Option<RepoRef> {
    let candidates = meta.home_page.iter().chain(
        meta.project_urls
            .iter()
            .filter(|entry| match &entry.label {
                Some(label) => REPO_LABELS.contains(&normalize_label(label).as_str()),
                None => true,
            })
            .map(|entry| &entry.url),
    );

    candidates.into_iter().find_map(|url| RepoRef::from_url(url))
}

/// Expand a FUNDING.yml document into `(label, url)` pairs
///
/// Values may be a single string or a list of strings. Unknown platforms and
/// empty values are skipped.
pub fn parse_funding_yml(content: &str) -> Result<Vec<(String, String)>, serde_yml::Error> {
    let document: serde_yml::Value = serde_yml::from_str(content)?;
    let Some(mapping) = document.as_mapping() else {
        return Ok(Vec::new());
    };

    let mut links = Vec::new();
    for (platform, value) in mapping.iter() {
        let Some(platform) = platform.as_str() else {
            continue;
        };

        let values: Vec<&str> = match value {
            serde_yml::Value::String(s) => vec![s.as_str()],
            serde_yml::Value::Sequence(items) => items.iter().filter_map(|v| v.as_str()).collect(),
            _ => Vec::new(),
        };

        for value in values.into_iter().map(str::trim).filter(|v| !v.is_empty()) {
            if let Some(link) = platform_link(platform, value) {
                links.push(link);
            }
        }
    }

    Ok(links)
}

/// Map a FUNDING.yml platform key and value to a labelled URL
fn platform_link(platform: &str, value: &str) -> Option<(String, String)> {
    let (label, url) = match platform {
        "github" => ("GitHub Sponsors", format!("https://github.com/sponsors/{}", value)),
        "patreon" => ("Patreon", format!("https://www.patreon.com/{}", value)),
        "open_collective" => ("Open Collective", format!("https://opencollective.com/{}", value)),
        "ko_fi" => ("Ko-fi", format!("https://ko-fi.com/{}", value)),
        "tidelift" => ("Tidelift", format!("https://tidelift.com/funding/github/{}", value)),
        "community_bridge" => (
            "LFX Mentorship",
            format!("https://funding.communitybridge.org/projects/{}", value),
        ),
        "liberapay" => ("Liberapay", format!("https://liberapay.com/{}", value)),
        "issuehunt" => ("IssueHunt", format!("https://issuehunt.io/r/{}", value)),
        "polar" => ("Polar", format!("https://polar.sh/{}", value)),
        "buy_me_a_coffee" => ("Buy Me a Coffee", format!("https://www.buymeacoffee.com/{}", value)),
        "thanks_dev" => ("thanks.dev", format!("https://thanks.dev/{}", value)),
        "custom" => ("Custom", value.to_string()),
        _ => return None,
    };
    Some((label.to_string(), url))
}

/// Something that can list sponsor links for a repository
pub trait SponsorSource {
    /// Sponsor links as `(label, url)` pairs; empty when none can be found
    fn sponsors(&self, repo: &RepoRef) -> Vec<(String, String)>;
}

/// Reads FUNDING.yml through the GitHub REST API
pub struct GitHubSponsors {
    agent: ureq::Agent,
    api_url: String,
    token: String,
}

impl GitHubSponsors {
    pub fn new(agent: ureq::Agent, api_url: &str, token: String) -> Self {
        Self {
            agent,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn contents_url(&self, repo: &RepoRef) -> String {
        format!(
            "{}/repos/{}/{}/contents/.github/FUNDING.yml",
            self.api_url, repo.owner, repo.repo
        )
    }

    /// Fetch the raw FUNDING.yml of a repository
    pub fn fetch_funding_file(&self, repo: &RepoRef) -> Result<String, GitHubError> {
        let url = self.contents_url(repo);
        tracing::debug!("GET {}", url);

        let response = match self
            .agent
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github.raw+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("Authorization", format!("Bearer {}", self.token))
            .call()
        {
            Ok(response) => response,
            Err(ureq::Error::StatusCode(404)) => {
                return Err(GitHubError::NotFound {
                    repo: repo.to_string(),
                });
            }
            Err(ureq::Error::StatusCode(status @ (401 | 403))) => {
                return Err(GitHubError::Unauthorized {
                    repo: repo.to_string(),
                    status,
                });
            }
            Err(e) => {
                return Err(GitHubError::Fetch {
                    repo: repo.to_string(),
                    message: e.to_string(),
                });
            }
        };

        response
            .into_body()
            .read_to_string()
            .map_err(|e| GitHubError::Fetch {
                repo: repo.to_string(),
                message: e.to_string(),
            })
    }
}

impl SponsorSource for GitHubSponsors {
    fn sponsors(&self, repo: &RepoRef) -> Vec<(String, String)> {
        let result = self.fetch_funding_file(repo).and_then(|content| {
            parse_funding_yml(&content).map_err(|e| GitHubError::Parse {
                repo: repo.to_string(),
                message: e.to_string(),
            })
        });

        match result {
            Ok(links) => links,
            Err(e) => {
                tracing::debug!("{}", e);
                Vec::new()
            }
        }
    }
}
