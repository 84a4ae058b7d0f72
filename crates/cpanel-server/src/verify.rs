//! URL reachability checks.

use std::time::Duration;

use async_trait::async_trait;
use ureq::Agent;
use url::Url;

use crate::error::VerifyError;

/// Checks whether a URL is reachable before browsers are sent there.
#[async_trait]
pub trait UrlVerifier: Send + Sync {
    /// Verify `url` is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be reached.
    async fn verify(&self, url: &Url) -> Result<(), VerifyError>;
}

/// Verifies URLs with an HTTP GET; only `200 OK` counts as reachable.
#[derive(Clone)]
pub struct HttpVerifier {
    agent: Agent,
}

impl HttpVerifier {
    /// Create a verifier whose requests give up after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }

    fn check(agent: &Agent, url: &str) -> Result<(), VerifyError> {
        let response = agent
            .get(url)
            .call()
            .map_err(|e| VerifyError::Unreachable {
                url: url.to_owned(),
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(VerifyError::Status {
                url: url.to_owned(),
                status,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl UrlVerifier for HttpVerifier {
    async fn verify(&self, url: &Url) -> Result<(), VerifyError> {
        let agent = self.agent.clone();
        let target = url.to_string();
        let failed_target = target.clone();

        tokio::task::spawn_blocking(move || Self::check(&agent, &target))
            .await
            .map_err(|e| VerifyError::Unreachable {
                url: failed_target,
                message: e.to_string(),
            })?
    }
}

/// Resolve a URL relative to the host's local URL.
///
/// # Errors
///
/// Returns an error if `base` is not an absolute URL or `relative` cannot
/// be joined onto it.
pub fn create_url(base: &str, relative: &str) -> Result<Url, VerifyError> {
    Ok(Url::parse(base)?.join(relative)?)
}
