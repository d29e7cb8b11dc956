use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Schema, SqlErr,
};

use crate::{
    domain::{
        error::RepositoryError,
        models::{
            encoded_credential::EncodedCredential,
            user::{UserAccount, UserId, Username},
        },
        repositories::user_repository::UserRepository,
    },
    infrastructure::entity::users,
};

#[derive(Clone)]
pub struct PostgresUserRepository {
    db: Arc<DatabaseConnection>,
}

impl PostgresUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db: Arc::new(db) }
    }

    /// Create the `users` table if it is missing
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        let backend = self.db.get_database_backend();
        let mut statement = Schema::new(backend).create_table_from_entity(users::Entity);
        statement.if_not_exists();

        self.db
            .as_ref()
            .execute(backend.build(&statement))
            .await
            .map_err(database_error)?;
        Ok(())
    }
}

fn database_error(e: DbErr) -> RepositoryError {
    RepositoryError::DatabaseError(e.to_string())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn save(
        &self,
        id: UserId,
        username: &Username,
        encoded_credential: &EncodedCredential,
    ) -> Result<(), RepositoryError> {
        let user_model = users::ActiveModel {
            id: Set(*id.as_uuid()),
            username: Set(username.as_str().to_string()),
            password_hash: Set(encoded_credential.as_str().to_string()),
        };

        users::Entity::insert(user_model)
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => RepositoryError::Conflict(format!(
                    "username {} already exists",
                    username.as_str()
                )),
                _ => database_error(e),
            })?;
        Ok(())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<UserAccount>, RepositoryError> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username.as_str()))
            .one(self.db.as_ref())
            .await
            .map_err(database_error)?;

        match user {
            Some(model) => {
                let username = Username::new(model.username)
                    .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;
                Ok(Some(UserAccount::new(
                    UserId::from_uuid(model.id),
                    username,
                    EncodedCredential::new(model.password_hash),
                )))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use super::*;

    const TEST_ID: &str = "00000000-0000-0000-0000-000000000001";
    const STORED_HASH: &str =
        "v1-iterated$4$AAAAAAAAAAAAAAAAAAAAAA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

    fn username(raw: &str) -> Username {
        Username::new(raw.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_find_by_username_positive() {
        let id = Uuid::parse_str(TEST_ID).unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![users::Model {
                id,
                username: "guest_user".to_string(),
                password_hash: STORED_HASH.to_string(),
            }]])
            .into_connection();
        let repository = PostgresUserRepository::new(db);

        let account = repository
            .find_by_username(&username("guest_user"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(account.id(), UserId::from_uuid(id));
        assert_eq!(account.username().as_str(), "guest_user");
        assert_eq!(account.encoded_credential().as_str(), STORED_HASH);
    }

    #[tokio::test]
    async fn test_find_by_username_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<users::Model>::new()])
            .into_connection();
        let repository = PostgresUserRepository::new(db);

        let account = repository
            .find_by_username(&username("nobody"))
            .await
            .unwrap();
        assert!(account.is_none());
    }

    #[tokio::test]
    async fn test_save_positive() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let repository = PostgresUserRepository::new(db);

        let result = repository
            .save(
                UserId::new(),
                &username("admin_user"),
                &EncodedCredential::new(STORED_HASH.to_string()),
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_save_database_failure_negative() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_errors([DbErr::Custom("connection reset".to_string())])
            .into_connection();
        let repository = PostgresUserRepository::new(db);

        let result = repository
            .save(
                UserId::new(),
                &username("admin_user"),
                &EncodedCredential::new(STORED_HASH.to_string()),
            )
            .await;
        assert!(matches!(result, Err(RepositoryError::DatabaseError(_))));
    }

    #[tokio::test]
    async fn test_ensure_schema() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let repository = PostgresUserRepository::new(db);

        assert!(repository.ensure_schema().await.is_ok());
    }

    #[tokio::test]
    async fn test_clones_share_connection() {
        let id = Uuid::parse_str(TEST_ID).unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![users::Model {
                id,
                username: "guest_user".to_string(),
                password_hash: STORED_HASH.to_string(),
            }]])
            .into_connection();
        let repository = PostgresUserRepository::new(db);
        let clone = repository.clone();

        let account = clone
            .find_by_username(&username("guest_user"))
            .await
            .unwrap();
        assert_eq!(account.map(|a| a.id()), Some(UserId::from_uuid(id)));
    }
}
