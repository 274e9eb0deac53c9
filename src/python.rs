//! Python ecosystem support
//!
//! Handles:
//! - Locating site-packages directories
//! - Reading installed distribution metadata (dist-info, egg-info)
//! - Project URL lookups via the PyPI JSON API

mod metadata;
mod pypi;
mod site;

pub use metadata::LocalSource;
pub use pypi::PyPiSource;
pub use site::site_packages_dirs;
