use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::Client;
use tracing::debug;

const APP_USER_AGENT: &str = "packlab/0.1.0";

/// How long a reachability probe may take before the upstream is
/// declared unreachable.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    Client::builder()
        .user_agent(APP_USER_AGENT)
        .default_headers(default_headers)
        .build()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    Reachable,
    Unreachable,
}

/// Bounded reachability check against an upstream endpoint.
///
/// Timeouts and transport errors degrade to `Unreachable` instead of
/// propagating; callers use this for status reporting only.
pub async fn probe(client: &Client, url: &str) -> ProbeStatus {
    let request = client.get(url).send();
    match tokio::time::timeout(PROBE_TIMEOUT, request).await {
        Ok(Ok(response)) if response.status().is_success() => ProbeStatus::Reachable,
        Ok(Ok(response)) => {
            debug!("Probe of {} returned HTTP {}", url, response.status());
            ProbeStatus::Unreachable
        }
        Ok(Err(e)) => {
            debug!("Probe of {} failed: {}", url, e);
            ProbeStatus::Unreachable
        }
        Err(_) => {
            debug!("Probe of {} timed out", url);
            ProbeStatus::Unreachable
        }
    }
}
