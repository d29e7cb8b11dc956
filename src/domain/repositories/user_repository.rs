use async_trait::async_trait;

use crate::domain::{
    error::RepositoryError,
    models::{
        encoded_credential::EncodedCredential,
        user::{UserAccount, UserId, Username},
    },
};

/// Persistence collaborator for accounts. Stores encodings verbatim.
#[async_trait]
pub trait UserRepository {
    /// Store a new account; fails with `Conflict` if the username is taken
    async fn save(
        &self,
        id: UserId,
        username: &Username,
        encoded_credential: &EncodedCredential,
    ) -> Result<(), RepositoryError>;

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<UserAccount>, RepositoryError>;
}
