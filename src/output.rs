//! Output formatting for text, Markdown and JSON modes
//!
//! Every format states explicitly when nothing was found, and distinguishes
//! "no packages could be scanned" from "no funding links declared".

use crate::funding::FundingEntry;
use crate::scan::{ScanReport, Skipped};
use serde::{Deserialize, Serialize};

pub const NO_FUNDING_MESSAGE: &str = "No funding links found for any packages.";
pub const NO_PACKAGES_MESSAGE: &str = "No packages could be scanned.";

const SEPARATOR_WIDTH: usize = 30;

/// JSON document describing a scan
#[derive(Debug, Serialize, Deserialize)]
pub struct FundingReport {
    pub scanned: usize,
    pub funding: Vec<FundingLink>,
    pub skipped: Vec<SkippedPackage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A single funding URL in JSON output
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FundingLink {
    pub url: String,
    pub label: String,
    pub packages: Vec<String>,
}

/// A package that could not be scanned, in JSON output
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkippedPackage {
    pub package: String,
    pub reason: String,
}

impl From<&FundingEntry> for FundingLink {
    fn from(entry: &FundingEntry) -> Self {
        Self {
            url: entry.url.clone(),
            label: entry.label.clone(),
            packages: entry.packages.iter().cloned().collect(),
        }
    }
}

impl From<&Skipped> for SkippedPackage {
    fn from(skipped: &Skipped) -> Self {
        Self {
            package: skipped.package.clone(),
            reason: skipped.reason.clone(),
        }
    }
}

impl From<&ScanReport> for FundingReport {
    fn from(report: &ScanReport) -> Self {
        Self {
            scanned: report.scanned,
            funding: report.entries.iter().map(FundingLink::from).collect(),
            skipped: report.skipped.iter().map(SkippedPackage::from).collect(),
            message: empty_message(report).map(str::to_string),
        }
    }
}

/// The message to show instead of entries, if there are none
fn empty_message(report: &ScanReport) -> Option<&'static str> {
    if !report.entries.is_empty() {
        None
    } else if report.scanned == 0 {
        Some(NO_PACKAGES_MESSAGE)
    } else {
        Some(NO_FUNDING_MESSAGE)
    }
}

/// Render a human-readable report
pub fn render_text(report: &ScanReport) -> String {
    let mut lines: Vec<String> = Vec::new();

    match empty_message(report) {
        Some(NO_FUNDING_MESSAGE) => {
            lines.push(NO_FUNDING_MESSAGE.to_string());
            lines.push("This could mean:".to_string());
            lines.push("  - No packages declare funding links in their metadata.".to_string());
            lines.push(
                "  - The packages use an older metadata format that doesn't support 'Project-URL'."
                    .to_string(),
            );
            lines.push(
                "  - The funding links are present but use a different, unrecognised label."
                    .to_string(),
            );
        }
        Some(message) => lines.push(message.to_string()),
        None => {
            lines.push("--- Funding Information Found ---".to_string());
            for entry in &report.entries {
                lines.push(format!("{}: {}", entry.label, entry.url));
                lines.push(format!("  Packages: {}", join_packages(entry)));
                lines.push("-".repeat(SEPARATOR_WIDTH));
            }
        }
    }

    if !report.skipped.is_empty() {
        lines.push(String::new());
        lines.push(format!("Skipped {} package(s):", report.skipped.len()));
        for skipped in &report.skipped {
            lines.push(format!("  {}: {}", skipped.package, skipped.reason));
        }
    }

    lines.join("\n")
}

/// Render a Markdown document
pub fn render_markdown(report: &ScanReport) -> String {
    let mut lines: Vec<String> = Vec::new();

    match empty_message(report) {
        Some(message) => lines.push(message.to_string()),
        None => {
            lines.push("# Funding Information\n".to_string());
            for entry in &report.entries {
                lines.push(format!("* **{}**: {}", entry.label, entry.url));
                lines.push(format!("  - Packages: {}\n", join_packages(entry)));
            }
        }
    }

    if !report.skipped.is_empty() {
        if lines.last().is_some_and(|l| !l.ends_with('\n')) {
            lines.push(String::new());
        }
        lines.push("## Skipped Packages\n".to_string());
        for skipped in &report.skipped {
            lines.push(format!("* `{}`: {}", skipped.package, skipped.reason));
        }
    }

    lines.join("\n")
}

/// Render pretty-printed JSON
pub fn render_json(report: &ScanReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&FundingReport::from(report))
}

fn join_packages(entry: &FundingEntry) -> String {
    entry
        .packages
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
