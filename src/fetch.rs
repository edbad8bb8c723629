use crate::{ArchiverError, Result};
use std::io::Read;
use std::time::Duration;

// Fixed browser-like request identity; immutable configuration, not state.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
const FETCH_TIMEOUT_SECS: u64 = 25;

/// One agent per run: browser-like User-Agent, 25s global timeout, manual
/// status handling so non-2xx responses map onto our own error type.
pub fn build_agent() -> ureq::Agent {
    let mut config = ureq::Agent::config_builder();
    config = config
        .http_status_as_error(false)
        .timeout_global(Some(Duration::from_secs(FETCH_TIMEOUT_SECS)))
        .user_agent(DEFAULT_USER_AGENT);
    config.build().into()
}

/// GET the URL and return the response body. Transport errors, timeouts and
/// statuses >= 400 all surface as [`ArchiverError::Fetch`]. No retries;
/// redirects are whatever the client does by default.
pub fn fetch_bytes(agent: &ureq::Agent, url: &str) -> Result<Vec<u8>> {
    let mut response = agent
        .get(url)
        .header("Accept-Language", ACCEPT_LANGUAGE)
        .call()
        .map_err(|err| ArchiverError::Fetch {
            url: url.to_string(),
            reason: err.to_string(),
        })?;

    let status = response.status();
    if status.as_u16() >= 400 {
        return Err(ArchiverError::Fetch {
            url: url.to_string(),
            reason: format!("status={status}"),
        });
    }

    let mut data = Vec::new();
    response
        .body_mut()
        .as_reader()
        .read_to_end(&mut data)
        .map_err(|err| ArchiverError::Fetch {
            url: url.to_string(),
            reason: err.to_string(),
        })?;
    Ok(data)
}
