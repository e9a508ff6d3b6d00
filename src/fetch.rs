//! Mirror-fallback document fetching.
//!
//! The listing pages live behind IPFS/ZeroNet gateways, any of which can be
//! down, slow, or serving a stale stub at a given moment. The fetcher walks
//! an ordered mirror list and returns the first success; failures are
//! *horizontal* — a bad mirror is skipped, never retried.

use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::{MirrorFailure, ScrapeError};

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// HTTP client wrapper with the pipeline's timeout applied to every attempt.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(APP_USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    /// Fetch `resource` from the first mirror that yields a success status
    /// and a non-empty body. The body is decoded to UTF-8 by `reqwest`
    /// according to the response charset.
    ///
    /// Timeouts, connection failures, bad statuses, and empty bodies all
    /// move on to the next mirror with a `warn!`; only exhausting the whole
    /// list is an error.
    #[instrument(level = "info", skip_all, fields(%resource, mirrors = mirrors.len()))]
    pub async fn fetch_first(
        &self,
        resource: &str,
        mirrors: &[String],
    ) -> Result<String, ScrapeError> {
        let mut last_failure = None;

        for mirror in mirrors {
            match self.try_mirror(mirror).await {
                Ok(body) => {
                    info!(%mirror, bytes = body.len(), "Fetched document");
                    return Ok(body);
                }
                Err(failure) => {
                    warn!(%mirror, error = %failure, "Mirror failed; trying next");
                    last_failure = Some(failure);
                }
            }
        }

        Err(ScrapeError::AllMirrorsFailed {
            resource: resource.to_string(),
            attempts: mirrors.len(),
            last: last_failure,
        })
    }

    async fn try_mirror(&self, url: &str) -> Result<String, MirrorFailure> {
        debug!(%url, "Requesting mirror");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MirrorFailure::Status(status));
        }
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(MirrorFailure::EmptyBody);
        }
        Ok(body)
    }
}
