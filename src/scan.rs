//! Funding scan over installed or named packages
//!
//! For each package, funding links are collected from:
//! 1. Installed metadata
//! 2. The registry (`--remote`), for named packages always, for a full scan
//!    only when installed metadata declared nothing
//! 3. FUNDING.yml on GitHub (`--github`), only while nothing has been found
//!
//! Per-package failures are logged and recorded, never fatal.

use crate::funding::{Aggregator, FundingEntry, FundingMatcher};
use crate::github::{SponsorSource, find_repo};
use crate::python::LocalSource;
use crate::source::{MetadataSource, PackageMetadata, SourceError};

/// A package that could not be scanned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub package: String,
    pub reason: String,
}

/// Outcome of a scan
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Packages whose metadata was read from at least one source
    pub scanned: usize,
    /// Funding links grouped by canonical URL, sorted by URL
    pub entries: Vec<FundingEntry>,
    pub skipped: Vec<Skipped>,
}

pub struct Scanner<'a> {
    local: &'a LocalSource,
    remote: Option<&'a dyn MetadataSource>,
    sponsors: Option<&'a dyn SponsorSource>,
    matcher: FundingMatcher,
}

impl<'a> Scanner<'a> {
    pub fn new(local: &'a LocalSource, matcher: FundingMatcher) -> Self {
        Self {
            local,
            remote: None,
            sponsors: None,
            matcher,
        }
    }

    pub fn with_remote(mut self, remote: Option<&'a dyn MetadataSource>) -> Self {
        self.remote = remote;
        self
    }

    pub fn with_sponsors(mut self, sponsors: Option<&'a dyn SponsorSource>) -> Self {
        self.sponsors = sponsors;
        self
    }

    /// Scan the named packages, or every installed package when none are named
    pub fn scan(&self, packages: &[String]) -> ScanReport {
        let mut report = ScanReport::default();
        let mut aggregator = Aggregator::new();

        if packages.is_empty() {
            self.scan_installed(&mut aggregator, &mut report);
        } else {
            for package in packages {
                self.scan_named(package, &mut aggregator, &mut report);
            }
        }

        report.entries = aggregator.finish();
        report
    }

    fn scan_installed(&self, aggregator: &mut Aggregator, report: &mut ScanReport) {
        for dist in self.local.installed() {
            let meta = match self.local.load(dist) {
                Ok(meta) => meta,
                Err(e) => {
                    skip(report, &dist.name, &e);
                    continue;
                }
            };
            report.scanned += 1;

            let name = meta.name.clone();
            let mut sources = vec![meta];
            self.collect(&name, &sources, aggregator);

            if !aggregator.has_package(&name)
                && let Some(remote) = self.remote
            {
                match remote.fetch(&name) {
                    Ok(remote_meta) => {
                        self.collect(&name, std::slice::from_ref(&remote_meta), aggregator);
                        sources.push(remote_meta);
                    }
                    Err(e) => tracing::warn!("{} lookup failed: {}", remote.name(), e),
                }
            }

            self.collect_sponsors(&name, &sources, aggregator);
        }
    }

    fn scan_named(&self, package: &str, aggregator: &mut Aggregator, report: &mut ScanReport) {
        let mut sources: Vec<PackageMetadata> = Vec::new();
        let mut failures: Vec<SourceError> = Vec::new();

        match self.local.fetch(package) {
            Ok(meta) => sources.push(meta),
            Err(SourceError::NotFound { .. }) if self.remote.is_some() => {
                tracing::debug!("{} is not installed", package);
            }
            Err(SourceError::NotFound { .. }) => {
                tracing::warn!("{} is not installed; pass --remote to query PyPI", package);
                report.skipped.push(Skipped {
                    package: package.to_string(),
                    reason: "not installed (pass --remote to query PyPI)".to_string(),
                });
                return;
            }
            Err(e) => failures.push(e),
        }

        if let Some(remote) = self.remote {
            match remote.fetch(package) {
                Ok(meta) => sources.push(meta),
                Err(e) => failures.push(e),
            }
        }

        if sources.is_empty() {
            if let Some(e) = failures.first() {
                for extra in &failures[1..] {
                    tracing::warn!("{}", extra);
                }
                skip(report, package, e);
            }
            return;
        }

        for e in &failures {
            tracing::warn!("{}", e);
        }

        report.scanned += 1;
        self.collect(package, &sources, aggregator);
        self.collect_sponsors(package, &sources, aggregator);
    }

    /// Add every funding link declared in `sources` under `package`
    fn collect(&self, package: &str, sources: &[PackageMetadata], aggregator: &mut Aggregator) {
        for meta in sources {
            for (label, url) in meta.funding_links(&self.matcher) {
                aggregator.add(package, &label, &url);
            }
        }
    }

    /// Fall back to FUNDING.yml when nothing has been found for `package`
    fn collect_sponsors(
        &self,
        package: &str,
        sources: &[PackageMetadata],
        aggregator: &mut Aggregator,
    ) {
        let Some(sponsors) = self.sponsors else {
            return;
        };
        if aggregator.has_package(package) {
            return;
        }

        let Some(repo) = sources.iter().find_map(find_repo) else {
            tracing::debug!("No GitHub repository known for {}", package);
            return;
        };

        for (label, url) in sponsors.sponsors(&repo) {
            aggregator.add(package, &label, &url);
        }
    }
}

fn skip(report: &mut ScanReport, package: &str, error: &SourceError) {
    tracing::warn!("Skipping {}: {}", package, error);
    report.skipped.push(Skipped {
        package: package.to_string(),
        reason: error.to_string(),
    });
}
