//! Shared HTTP client setup

use std::time::Duration;

pub const USER_AGENT: &str = concat!("pip-fund/", env!("CARGO_PKG_VERSION"));

/// Upper bound for a single request, connect to last byte
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Build the agent used for every registry and GitHub request
pub fn agent() -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(REQUEST_TIMEOUT))
        .build();
    ureq::Agent::new_with_config(config)
}
