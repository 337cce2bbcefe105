use std::sync::Arc;

use tracing::debug;

use liftgate_core::{AppResult, Guard, UserIdentity};

use crate::ApiTokenRepository;

/// Resolves bearer tokens to identities of the `api` guard.
#[derive(Clone)]
pub struct ApiTokenService {
    repository: Arc<dyn ApiTokenRepository>,
}

impl ApiTokenService {
    /// Creates a token service over a token repository.
    #[must_use]
    pub fn new(repository: Arc<dyn ApiTokenRepository>) -> Self {
        Self { repository }
    }

    /// Returns the identity owning `raw_token`, or `None` for unknown tokens.
    pub async fn resolve_bearer(&self, raw_token: &str) -> AppResult<Option<UserIdentity>> {
        let raw_token = raw_token.trim();
        if raw_token.is_empty() {
            return Ok(None);
        }

        let Some(user) = self
            .repository
            .find_user_by_token_hash(&hash_api_token(raw_token))
            .await?
        else {
            debug!("bearer token did not resolve to a user");
            return Ok(None);
        };

        Ok(Some(UserIdentity::new(
            user.id(),
            user.display_name().as_str(),
            Some(user.email().as_str().to_owned()),
            Guard::Api,
        )))
    }
}

/// Computes the SHA-256 hex digest under which a bearer token is stored.
#[must_use]
pub fn hash_api_token(raw_token: &str) -> String {
    use sha2::{Digest, Sha256};
    use std::fmt::Write;

    let digest = Sha256::digest(raw_token.as_bytes());

    digest
        .iter()
        .fold(String::with_capacity(64), |mut acc, byte| {
            let _ = write!(acc, "{byte:02x}");
            acc
        })
}
