//! Shared holder for the upstream bearer token.

use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::RwLock;

/// Process-wide upstream access token.
///
/// Written by the credential refresher, read by every upstream call. Clones
/// share the same slot. Readers always see the last successfully fetched
/// token; nothing ever clears it.
#[derive(Clone, Default)]
pub struct AccessCredential {
    token: Arc<RwLock<Option<SecretString>>>,
}

impl AccessCredential {
    /// Create an empty holder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a holder that already carries a token.
    #[must_use]
    pub fn with_token(token: SecretString) -> Self {
        Self {
            token: Arc::new(RwLock::new(Some(token))),
        }
    }

    /// Current token, if one has been obtained.
    pub async fn current(&self) -> Option<SecretString> {
        self.token.read().await.clone()
    }

    /// Replace the current token.
    pub async fn set(&self, token: SecretString) {
        *self.token.write().await = Some(token);
    }

    pub async fn is_set(&self) -> bool {
        self.token.read().await.is_some()
    }
}

impl std::fmt::Debug for AccessCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessCredential")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[tokio::test]
    async fn test_clones_share_the_token() {
        let credential = AccessCredential::new();
        let reader = credential.clone();
        assert!(reader.current().await.is_none());

        credential.set(SecretString::from("first")).await;
        credential.set(SecretString::from("second")).await;

        let token = reader.current().await;
        assert_eq!(token.as_ref().map(|t| t.expose_secret()), Some("second"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let credential = AccessCredential::with_token(SecretString::from("bearer-value"));
        let debug_output = format!("{credential:?}");
        assert!(!debug_output.contains("bearer-value"));
    }
}
