//! Installed distribution metadata
//!
//! Supports reading core metadata from:
//! - `<name>-<version>.dist-info/METADATA` (wheel installs)
//! - `<name>-<version>.egg-info/PKG-INFO` (setuptools installs)
//! - `<name>-<version>.egg-info` files (legacy single-file egg-info)
//!
//! Metadata is an RFC 822 style header block. Only `Name`, `Home-page` and
//! `Project-URL` are used; everything after the first blank line is ignored.

use crate::source::{
    MetadataSource, PackageMetadata, ProjectUrl, SourceError, normalize_package_name,
};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// An installed distribution found in a site-packages directory
#[derive(Debug, Clone)]
pub struct InstalledDist {
    /// Name derived from the directory name, used until METADATA is read
    pub name: String,
    /// PEP 503 normalized name
    pub key: String,
    pub metadata_path: PathBuf,
}

/// Installed distributions across one or more site-packages directories
///
/// When the same distribution appears in several directories, the one from the
/// earliest directory wins, matching Python's import order.
#[derive(Debug, Default)]
pub struct LocalSource {
    dists: Vec<InstalledDist>,
}

impl LocalSource {
    /// Index every distribution found in `dirs`
    ///
    /// Unreadable directories are skipped with a warning.
    pub fn discover(dirs: &[PathBuf]) -> Self {
        let mut seen = HashSet::new();
        let mut dists = Vec::new();

        for dir in dirs {
            let entries = match fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", dir.display(), e);
                    continue;
                }
            };

            let mut found: Vec<InstalledDist> = entries
                .filter_map(|entry| entry.ok())
                .filter_map(|entry| dist_from_path(&entry.path()))
                .collect();
            // read_dir order is platform dependent
            found.sort_by(|a, b| a.metadata_path.cmp(&b.metadata_path));

            for dist in found {
                if seen.insert(dist.key.clone()) {
                    dists.push(dist);
                } else {
                    tracing::debug!(
                        "Ignoring shadowed distribution {}",
                        dist.metadata_path.display()
                    );
                }
            }
        }

        tracing::debug!("Found {} installed distributions", dists.len());
        Self { dists }
    }

    pub fn installed(&self) -> &[InstalledDist] {
        &self.dists
    }

    pub fn is_empty(&self) -> bool {
        self.dists.is_empty()
    }

    /// Read and parse the metadata file of an installed distribution
    pub fn load(&self, dist: &InstalledDist) -> Result<PackageMetadata, SourceError> {
        let bytes = fs::read(&dist.metadata_path).map_err(|e| SourceError::Read {
            package: dist.name.clone(),
            message: format!("{}: {}", dist.metadata_path.display(), e),
        })?;
        let content = String::from_utf8_lossy(&bytes);
        Ok(parse_metadata(&content, &dist.name))
    }

    fn find(&self, package: &str) -> Option<&InstalledDist> {
        let key = normalize_package_name(package);
        self.dists.iter().find(|dist| dist.key == key)
    }
}

impl MetadataSource for LocalSource {
    fn name(&self) -> &'static str {
        "installed metadata"
    }

    fn fetch(&self, package: &str) -> Result<PackageMetadata, SourceError> {
        let dist = self.find(package).ok_or_else(|| SourceError::NotFound {
            package: package.to_string(),
        })?;
        self.load(dist)
    }
}

/// Recognize a `.dist-info` or `.egg-info` entry and locate its metadata file
fn dist_from_path(path: &Path) -> Option<InstalledDist> {
    let file_name = path.file_name()?.to_str()?;

    let (stem, metadata_path) = if let Some(stem) = file_name.strip_suffix(".dist-info") {
        (stem, path.join("METADATA"))
    } else if let Some(stem) = file_name.strip_suffix(".egg-info") {
        if path.is_dir() {
            (stem, path.join("PKG-INFO"))
        } else {
            (stem, path.to_path_buf())
        }
    } else {
        return None;
    };

    // "<name>-<version>[-pyX.Y]"; names have '-' escaped to '_'
    let name = stem.split('-').next().unwrap_or(stem);
    if name.is_empty() {
        return None;
    }

    Some(InstalledDist {
        name: name.to_string(),
        key: normalize_package_name(name),
        metadata_path,
    })
}

/// Parse the header block of a core metadata file
///
/// `fallback_name` is used when the file carries no `Name` header.
pub fn parse_metadata(content: &str, fallback_name: &str) -> PackageMetadata {
    let mut meta = PackageMetadata::new(fallback_name);

    for (key, value) in parse_headers(content) {
        match key.to_ascii_lowercase().as_str() {
            "name" if !value.is_empty() => meta.name = value,
            "home-page" if !value.is_empty() && value != "UNKNOWN" => meta.home_page = Some(value),
            "project-url" => meta.project_urls.push(ProjectUrl::parse(&value)),
            _ => {}
        }
    }

    meta
}

/// Split an RFC 822 header block into `(key, value)` pairs
///
/// Continuation lines (leading whitespace) are folded into the previous value.
fn parse_headers(content: &str) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            break;
        }

        if line.starts_with([' ', '\t']) {
            if let Some((_, value)) = headers.last_mut() {
                value.push(' ');
                value.push_str(line.trim());
            }
            continue;
        }

        if let Some((key, value)) = line.split_once(':') {
            headers.push((key.trim().to_string(), value.trim().to_string()));
        }
    }

    headers
}
