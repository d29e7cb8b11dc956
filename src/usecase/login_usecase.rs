use std::sync::Arc;

use zeroize::Zeroizing;

use crate::domain::{
    error::{DomainError, EncodingError},
    models::{
        encoded_credential::{EncodedCredential, SchemeTag},
        user::{UserId, Username},
    },
    repositories::user_repository::UserRepository,
    services::strategy_registry::StrategyRegistry,
};

#[derive(Debug)]
pub struct LoginResult {
    pub user_id: UserId,
    pub username: Username,
    pub scheme: SchemeTag,
    /// Stored encoding uses a legacy scheme or weaker parameters
    pub needs_upgrade: bool,
}

/// Plaintext behind the placeholder encoding checked for unknown usernames
const PLACEHOLDER_PASSWORD: &str = "placeholder-credential";

pub struct LoginUsecase<U: UserRepository> {
    user_repository: U,
    registry: Arc<StrategyRegistry>,
    /// Verified against when no account matches, so both rejections pay
    /// for one hash with the default strategy
    placeholder: EncodedCredential,
}

impl<U: UserRepository> LoginUsecase<U> {
    pub fn new(user_repository: U, registry: Arc<StrategyRegistry>) -> Result<Self, EncodingError> {
        let placeholder = registry.encode(PLACEHOLDER_PASSWORD)?;
        Ok(Self {
            user_repository,
            registry,
            placeholder,
        })
    }

    pub async fn login(
        &self,
        username: String,
        password: String,
    ) -> Result<LoginResult, DomainError>
    where
        U: Send + Sync,
    {
        let password = Zeroizing::new(password);
        let account = match Username::new(username) {
            Ok(username) => self.user_repository.find_by_username(&username).await?,
            Err(_) => None,
        };
        let Some(account) = account else {
            self.verify_placeholder(password).await?;
            tracing::info!("login rejected: unknown user");
            return Err(DomainError::AuthenticationFailed);
        };
        let username = account.username().clone();
        let user_id = account.id();

        let registry = Arc::clone(&self.registry);
        let encoded = account.encoded_credential().clone();
        let outcome = tokio::task::spawn_blocking(
            move || -> Result<(SchemeTag, bool, bool), EncodingError> {
                let scheme = encoded.scheme()?;
                let matched = registry.verify(&password, &encoded)?;
                let needs_upgrade = matched && registry.needs_upgrade(&encoded)?;
                Ok((scheme, matched, needs_upgrade))
            },
        )
        .await
        .map_err(|e| DomainError::TaskFailed(e.to_string()))?;

        match outcome {
            Ok((scheme, true, needs_upgrade)) => {
                tracing::info!(
                    user_id = %user_id.as_uuid(),
                    scheme = %scheme,
                    needs_upgrade,
                    "login verified"
                );
                Ok(LoginResult {
                    user_id,
                    username,
                    scheme,
                    needs_upgrade,
                })
            }
            Ok((scheme, false, _)) => {
                tracing::info!(
                    user_id = %user_id.as_uuid(),
                    scheme = %scheme,
                    "login rejected: credential mismatch"
                );
                Err(DomainError::AuthenticationFailed)
            }
            Err(e) => {
                // unreadable or foreign encodings count as a failed login
                tracing::warn!(
                    user_id = %user_id.as_uuid(),
                    error = %e,
                    "stored credential could not be verified"
                );
                Err(DomainError::AuthenticationFailed)
            }
        }
    }

    async fn verify_placeholder(&self, password: Zeroizing<String>) -> Result<(), DomainError> {
        let registry = Arc::clone(&self.registry);
        let placeholder = self.placeholder.clone();
        tokio::task::spawn_blocking(move || registry.check(&password, &placeholder))
            .await
            .map_err(|e| DomainError::TaskFailed(e.to_string()))?;
        Ok(())
    }
}
