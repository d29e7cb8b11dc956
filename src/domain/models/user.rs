use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{error::DomainError, models::encoded_credential::EncodedCredential};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);
impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(String);
impl Username {
    pub fn new(value: String) -> Result<Self, DomainError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyUsername);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Stored account: identifier, username and encoded credential
#[derive(Debug, Clone)]
pub struct UserAccount {
    id: UserId,
    username: Username,
    encoded_credential: EncodedCredential,
}

impl UserAccount {
    pub fn new(id: UserId, username: Username, encoded_credential: EncodedCredential) -> Self {
        Self {
            id,
            username,
            encoded_credential,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }
    pub fn username(&self) -> &Username {
        &self.username
    }
    pub fn encoded_credential(&self) -> &EncodedCredential {
        &self.encoded_credential
    }
}
