use clap::Parser;
use std::fmt;
use std::path::PathBuf;

/// List funding links declared by Python packages
///
/// Without arguments every installed package is scanned; otherwise only the
/// named packages are inspected.
#[derive(Parser, Debug)]
#[command(name = "pip-fund")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Names of packages to inspect. If omitted, all installed packages are scanned.
    pub packages: Vec<String>,

    /// Query the PyPI JSON API for project URLs (requires network access)
    #[arg(long)]
    pub remote: bool,

    /// Look for .github/FUNDING.yml in the package's GitHub repository (needs GITHUB_TOKEN)
    #[arg(long)]
    pub github: bool,

    /// Output the results as JSON
    #[arg(long, conflicts_with = "markdown")]
    pub json: bool,

    /// Output the results as Markdown
    #[arg(long)]
    pub markdown: bool,

    /// Site-packages directory to scan instead of asking the Python interpreter (repeatable)
    #[arg(long = "path", value_name = "DIR")]
    pub paths: Vec<PathBuf>,

    /// Log lookup details to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl Cli {
    pub fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else if self.markdown {
            OutputFormat::Markdown
        } else {
            OutputFormat::Text
        }
    }
}
