//! Upstream authentication.
//!
//! Obtains access tokens with the OAuth password grant.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::{CredentialSource, UpstreamError};
use crate::config::OrderCloudConfig;

/// Token obtained from the upstream auth endpoint.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// Bearer token for API requests.
    pub access_token: SecretString,
    /// Token lifetime in seconds.
    pub expires_in: u64,
}

/// Response from the token endpoint.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

/// Password-grant [`CredentialSource`].
#[derive(Clone)]
pub struct PasswordGrant {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: SecretString,
    username: String,
    password: SecretString,
    refresh_interval: Duration,
}

impl PasswordGrant {
    /// Create a password-grant source for the configured API user.
    #[must_use]
    pub fn new(client: reqwest::Client, config: &OrderCloudConfig) -> Self {
        Self {
            client,
            token_url: format!("{}/oauth/token", config.api_url),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            refresh_interval: config.token_refresh_interval,
        }
    }
}

#[async_trait]
impl CredentialSource for PasswordGrant {
    /// Authenticate with the password grant.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError::Status` if the credentials are rejected and
    /// `UpstreamError::Decode` if the response is not a token.
    #[instrument(skip(self), fields(username = %self.username))]
    async fn fetch(&self) -> Result<AccessToken, UpstreamError> {
        let form = [
            ("grant_type", "password"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret()),
            ("username", self.username.as_str()),
            ("password", self.password.expose_secret()),
        ];

        let response = self.client.post(&self.token_url).form(&form).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Token endpoint returned non-success status");
            return Err(UpstreamError::Status {
                resource: "access token",
                status,
            });
        }

        let body = response.bytes().await?;
        let token: TokenResponse = serde_json::from_slice(&body)?;

        info!(expires_in = token.expires_in, "Obtained upstream access token");
        if token.expires_in > 0 && self.refresh_interval.as_secs() > token.expires_in {
            warn!(
                expires_in = token.expires_in,
                refresh_secs = self.refresh_interval.as_secs(),
                "Token refresh interval exceeds token lifetime"
            );
        }

        Ok(AccessToken {
            access_token: SecretString::from(token.access_token),
            expires_in: token.expires_in,
        })
    }
}
