mod cli;
mod config;
mod funding;
mod github;
mod http;
mod logging;
mod output;
mod python;
mod scan;
mod source;

use clap::Parser;
use cli::{Cli, OutputFormat};
use config::Config;
use funding::FundingMatcher;
use github::{GitHubSponsors, SponsorSource};
use python::{LocalSource, PyPiSource};
use scan::Scanner;
use source::MetadataSource;

fn main() {
    // Usage errors exit here, before anything is scanned
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("{}; using defaults", e);
        Config::default()
    });

    let matcher = FundingMatcher::with_extra_aliases(&config.extra_aliases);

    let local = match python::site_packages_dirs(&cli.paths, &config) {
        Ok(dirs) => {
            let local = LocalSource::discover(&dirs);
            if local.is_empty() {
                tracing::debug!("No installed distributions in {} director(ies)", dirs.len());
            }
            local
        }
        Err(e) => {
            tracing::warn!("{}; installed packages will not be scanned", e);
            LocalSource::default()
        }
    };

    let agent = http::agent();

    let pypi = cli
        .remote
        .then(|| PyPiSource::new(agent.clone(), config.pypi_url()));

    let sponsors = if cli.github {
        match config.github_token() {
            Some(token) => Some(GitHubSponsors::new(
                agent.clone(),
                config.github_api_url(),
                token,
            )),
            None => {
                tracing::warn!(
                    "{} is not set; skipping GitHub FUNDING.yml lookups",
                    config.github_token_env()
                );
                None
            }
        }
    } else {
        None
    };

    let report = Scanner::new(&local, matcher)
        .with_remote(pypi.as_ref().map(|p| p as &dyn MetadataSource))
        .with_sponsors(sponsors.as_ref().map(|s| s as &dyn SponsorSource))
        .scan(&cli.packages);

    let rendered = match cli.format() {
        OutputFormat::Text => output::render_text(&report),
        OutputFormat::Markdown => output::render_markdown(&report),
        OutputFormat::Json => output::render_json(&report)?,
    };
    println!("{}", rendered);

    Ok(())
}
