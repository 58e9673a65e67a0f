//! Upstream access token refresher.
//!
//! Fetches a token at startup and then on a fixed interval, storing it in the
//! shared [`AccessCredential`] read by the upstream clients. A failed fetch
//! leaves the previous token in place.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

use super::ServiceError;
use crate::ordercloud::{AccessCredential, CredentialSource};

/// Periodically replaces the shared upstream access token.
pub struct CredentialRefresher {
    source: Arc<dyn CredentialSource>,
    credential: AccessCredential,
    interval: Duration,
}

impl CredentialRefresher {
    #[must_use]
    pub fn new(
        source: Arc<dyn CredentialSource>,
        credential: AccessCredential,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            credential,
            interval,
        }
    }

    /// Fetch a token once and publish it.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Upstream` if the fetch fails. The current token
    /// is not touched.
    #[instrument(skip(self))]
    pub async fn refresh_once(&self) -> Result<(), ServiceError> {
        let token = self.source.fetch().await?;
        self.credential.set(token.access_token).await;
        Ok(())
    }

    /// Refresh immediately, then on every interval until `shutdown` fires.
    ///
    /// Cancellation stops future fetches only; the last token stays readable.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            refresh_interval_secs = self.interval.as_secs(),
            "Credential refresher starting"
        );

        self.refresh_logged().await;

        let mut interval = tokio::time::interval(self.interval);
        // Skip the first immediate tick
        interval.tick().await;

        loop {
            tokio::select! {
                biased;

                () = shutdown.cancelled() => {
                    info!("Credential refresher shutting down");
                    break;
                }

                _ = interval.tick() => {
                    self.refresh_logged().await;
                }
            }
        }
    }

    async fn refresh_logged(&self) {
        match self.refresh_once().await {
            Ok(()) => info!("Refreshed upstream access token"),
            Err(e) => error!(error = %e, "Failed to refresh upstream access token"),
        }
    }
}
