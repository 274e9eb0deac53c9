//! Locating site-packages directories
//!
//! Directories are taken from the first of these that is configured:
//! 1. `--path` arguments
//! 2. `site_packages` in the config file
//! 3. `$VIRTUAL_ENV` (`lib/python*/site-packages` or `Lib/site-packages`)
//! 4. `sys.path` reported by the Python interpreter
//!
//! Only directories that exist are returned.

use crate::config::Config;
use crate::source::SourceError;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Interpreters tried, in order, when none is configured
const DEFAULT_INTERPRETERS: [&str; 2] = ["python3", "python"];

const SYS_PATH_SCRIPT: &str = "import sys\nfor p in sys.path:\n    print(p)";

/// Resolve the site-packages directories to scan
pub fn site_packages_dirs(
    explicit: &[PathBuf],
    config: &Config,
) -> Result<Vec<PathBuf>, SourceError> {
    if !explicit.is_empty() {
        return Ok(existing_dirs(explicit.to_vec()));
    }

    if !config.site_packages.is_empty() {
        return Ok(existing_dirs(config.site_packages.clone()));
    }

    if let Some(venv) = std::env::var_os("VIRTUAL_ENV").filter(|v| !v.is_empty()) {
        let dirs = venv_site_packages(Path::new(&venv));
        if !dirs.is_empty() {
            tracing::debug!("Using virtual environment {}", Path::new(&venv).display());
            return Ok(existing_dirs(dirs));
        }
    }

    let interpreters: Vec<&str> = match config.python.as_deref() {
        Some(python) => vec![python],
        None => DEFAULT_INTERPRETERS.to_vec(),
    };

    for python in &interpreters {
        match interpreter_sys_path(python) {
            Some(paths) => return Ok(existing_dirs(paths)),
            None => tracing::debug!("Interpreter '{}' unavailable", python),
        }
    }

    Err(SourceError::NoInterpreter {
        tried: interpreters.join(", "),
    })
}

/// Site-packages directories inside a virtual environment
fn venv_site_packages(venv: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    // Windows layout
    let windows = venv.join("Lib").join("site-packages");
    if windows.is_dir() {
        dirs.push(windows);
    }

    if let Ok(entries) = fs::read_dir(venv.join("lib")) {
        let mut versions: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("python"))
            })
            .map(|path| path.join("site-packages"))
            .filter(|path| path.is_dir())
            .collect();
        versions.sort();
        dirs.extend(versions);
    }

    dirs
}

/// Ask an interpreter for its `sys.path`
fn interpreter_sys_path(python: &str) -> Option<Vec<PathBuf>> {
    let output = Command::new(python)
        .args(["-c", SYS_PATH_SCRIPT])
        .output()
        .ok()?;

    if !output.status.success() {
        tracing::debug!(
            "'{}' exited with {}: {}",
            python,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Some(
        stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
            .collect(),
    )
}

/// Keep existing directories, dropping duplicates but preserving order
fn existing_dirs(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter(|path| {
            let exists = path.is_dir();
            if !exists {
                tracing::debug!("Ignoring missing directory {}", path.display());
            }
            exists
        })
        .filter(|path| seen.insert(path.clone()))
        .collect()
}
