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
pub struct RegisterResult {
    pub user_id: UserId,
    pub username: Username,
    pub scheme: SchemeTag,
    pub encoded_credential: EncodedCredential,
}

pub struct RegisterUserUsecase<R: UserRepository> {
    user_repository: R,
    registry: Arc<StrategyRegistry>,
}

impl<R: UserRepository> RegisterUserUsecase<R> {
    pub fn new(user_repository: R, registry: Arc<StrategyRegistry>) -> Self {
        Self {
            user_repository,
            registry,
        }
    }

    /// Encode `password` with `scheme` (or the registry default) and store the account.
    pub async fn register(
        &self,
        username: String,
        password: String,
        scheme: Option<SchemeTag>,
    ) -> Result<RegisterResult, DomainError>
    where
        R: Send + Sync,
    {
        let username = Username::new(username)?;
        let password = Zeroizing::new(password);
        let scheme = scheme.unwrap_or_else(|| self.registry.default_scheme());

        // refuse verify-only schemes before spending any hashing work
        self.registry.encoder(scheme)?;

        tracing::debug!(scheme = %scheme, "encoding credential");
        let registry = Arc::clone(&self.registry);
        let encoded_credential = tokio::task::spawn_blocking(
            move || -> Result<EncodedCredential, EncodingError> {
                registry.encoder(scheme)?.encode(&password)
            },
        )
        .await
        .map_err(|e| DomainError::TaskFailed(e.to_string()))??;

        let user_id = UserId::new();
        self.user_repository
            .save(user_id, &username, &encoded_credential)
            .await?;

        tracing::info!(
            user_id = %user_id.as_uuid(),
            scheme = %scheme,
            "credential stored"
        );

        Ok(RegisterResult {
            user_id,
            username,
            scheme,
            encoded_credential,
        })
    }
}
