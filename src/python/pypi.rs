//! PyPI registry integration
//!
//! Fetches package metadata from the PyPI JSON API to find declared project URLs.

use crate::http::USER_AGENT;
use crate::source::{MetadataSource, PackageMetadata, ProjectUrl, SourceError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;

/// Looks packages up in a PyPI-compatible JSON API
pub struct PyPiSource {
    agent: ureq::Agent,
    base_url: String,
}

impl PyPiSource {
    pub fn new(agent: ureq::Agent, base_url: &str) -> Self {
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn package_url(&self, package: &str) -> String {
        format!("{}/pypi/{}/json", self.base_url, package)
    }
}

impl MetadataSource for PyPiSource {
    fn name(&self) -> &'static str {
        "PyPI"
    }

    fn fetch(&self, package: &str) -> Result<PackageMetadata, SourceError> {
        let url = self.package_url(package);
        tracing::debug!("GET {}", url);

        let response = match self
            .agent
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/json")
            .call()
        {
            Ok(response) => response,
            Err(ureq::Error::StatusCode(404)) => {
                return Err(SourceError::NotFound {
                    package: package.to_string(),
                });
            }
            Err(e) => {
                return Err(SourceError::Network {
                    package: package.to_string(),
                    message: e.to_string(),
                });
            }
        };

        parse_response(response.into_body().into_reader(), package)
    }
}

/// PyPI JSON API response structure
#[derive(Deserialize)]
struct PyPiMetadata {
    info: PackageInfo,
}

#[derive(Deserialize)]
struct PackageInfo {
    name: Option<String>,
    project_urls: Option<BTreeMap<String, Option<String>>>,
    home_page: Option<String>,
}

/// Convert a PyPI JSON response body into package metadata
///
/// The body is streamed, so large release histories are not size-capped.
/// Entries with an empty label or URL are dropped.
fn parse_response(body: impl Read, package: &str) -> Result<PackageMetadata, SourceError> {
    let metadata: PyPiMetadata = serde_json::from_reader(body).map_err(|e| {
        if e.is_io() {
            SourceError::Network {
                package: package.to_string(),
                message: e.to_string(),
            }
        } else {
            SourceError::Parse {
                package: package.to_string(),
                message: e.to_string(),
            }
        }
    })?;

    let mut meta = PackageMetadata::new(package);
    if let Some(name) = metadata.info.name.filter(|n| !n.is_empty()) {
        meta.name = name;
    }
    meta.home_page = metadata.info.home_page.filter(|h| !h.trim().is_empty());

    if let Some(project_urls) = metadata.info.project_urls {
        meta.project_urls = project_urls
            .into_iter()
            .filter_map(|(label, url)| {
                let url = url?;
                let (label, url) = (label.trim(), url.trim());
                (!label.is_empty() && !url.is_empty()).then(|| ProjectUrl::labelled(label, url))
            })
            .collect();
    }

    Ok(meta)
}
