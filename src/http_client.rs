use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

// spid.json is several megabytes, so the read budget is wider than the
// connect budget. The agent string names the crawler in Nexon's request logs.
const CONNECT_TIMEOUT_SECS: u64 = 5;
const REQUEST_TIMEOUT_SECS: u64 = 20;
const USER_AGENT: &str = concat!("fco_pipeline/", env!("CARGO_PKG_VERSION"));

static NEXON_CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared by `NexonClient` and `ConditionalCache`.
pub fn http_client() -> Result<&'static Client> {
    NEXON_CLIENT.get_or_try_init(|| {
        Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .context("build nexon http client")
    })
}
