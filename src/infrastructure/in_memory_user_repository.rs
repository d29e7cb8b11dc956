use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use async_trait::async_trait;

use crate::domain::{
    error::RepositoryError,
    models::{
        encoded_credential::EncodedCredential,
        user::{UserAccount, UserId, Username},
    },
    repositories::user_repository::UserRepository,
};

/// Process-local account store, used when no database is configured.
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Username, UserAccount>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> RepositoryError {
    RepositoryError::DatabaseError("user store lock poisoned".to_string())
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save(
        &self,
        id: UserId,
        username: &Username,
        encoded_credential: &EncodedCredential,
    ) -> Result<(), RepositoryError> {
        let mut users = self.users.write().map_err(poisoned)?;
        if users.contains_key(username) {
            return Err(RepositoryError::Conflict(format!(
                "username {} already exists",
                username.as_str()
            )));
        }
        users.insert(
            username.clone(),
            UserAccount::new(id, username.clone(), encoded_credential.clone()),
        );
        Ok(())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<UserAccount>, RepositoryError> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.get(username).cloned())
    }
}
