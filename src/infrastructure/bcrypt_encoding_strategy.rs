use std::sync::Arc;

use zeroize::Zeroizing;

use crate::{
    domain::{
        error::EncodingError,
        models::{
            encoded_credential::{EncodedCredential, EncodedParts, SchemeTag},
            strategy_config::{
                BCRYPT_COST_RANGE, BCRYPT_DIGEST_LEN, BCRYPT_SALT_LEN, BcryptConfig,
            },
        },
        services::encoding_strategy::{EncodingStrategy, SaltGenerator, digests_match},
    },
    infrastructure::os_salt_generator::OsSaltGenerator,
};

/// Eksblowfish reads at most 72 key bytes, terminator included.
const MAX_KEY_LEN: usize = 72;

/// Highest cost accepted from storage unless the configured cost is higher.
/// Each step doubles the work, so a corrupt record cannot stall a worker.
const STORED_COST_MAX: u32 = 16;

/// Salted, iterated block-cipher strategy (bcrypt).
///
/// Kept to verify encodings produced before the memory-hard scheme became
/// the default.
#[derive(Clone)]
pub struct BcryptEncodingStrategy {
    config: BcryptConfig,
    salt_generator: Arc<dyn SaltGenerator>,
}

impl BcryptEncodingStrategy {
    pub fn new(config: BcryptConfig) -> Self {
        Self::with_salt_generator(config, Arc::new(OsSaltGenerator))
    }

    pub fn with_cost(cost: u32) -> Result<Self, EncodingError> {
        Ok(Self::new(BcryptConfig::new(cost)?))
    }

    pub fn with_salt_generator(
        config: BcryptConfig,
        salt_generator: Arc<dyn SaltGenerator>,
    ) -> Self {
        Self {
            config,
            salt_generator,
        }
    }

    pub fn config(&self) -> &BcryptConfig {
        &self.config
    }
}

impl Default for BcryptEncodingStrategy {
    fn default() -> Self {
        Self::new(BcryptConfig::default())
    }
}

// NUL-terminated and truncated to 72 bytes, as the 2b variant does
fn hash(cost: u32, salt: [u8; BCRYPT_SALT_LEN], plaintext: &str) -> [u8; BCRYPT_DIGEST_LEN] {
    let mut key = Zeroizing::new(Vec::with_capacity(plaintext.len() + 1));
    key.extend_from_slice(plaintext.as_bytes());
    key.push(0);
    key.truncate(MAX_KEY_LEN);
    bcrypt::bcrypt(cost, salt, &key)
}

impl EncodingStrategy for BcryptEncodingStrategy {
    fn scheme(&self) -> SchemeTag {
        SchemeTag::Iterated
    }

    fn encode(&self, plaintext: &str) -> Result<EncodedCredential, EncodingError> {
        let mut salt = [0u8; BCRYPT_SALT_LEN];
        self.salt_generator.fill(&mut salt)?;

        let digest = hash(self.config.cost(), salt, plaintext);

        Ok(EncodedParts::format(
            SchemeTag::Iterated,
            &[self.config.cost()],
            &salt,
            &digest,
        ))
    }

    fn matches(
        &self,
        plaintext: &str,
        encoded: &EncodedCredential,
    ) -> Result<bool, EncodingError> {
        let parts = EncodedParts::parse(encoded, SchemeTag::Iterated, 1)?;

        let cost = parts.param(0, "cost")?;
        let ceiling = STORED_COST_MAX.max(self.config.cost());
        if cost < *BCRYPT_COST_RANGE.start() || cost > ceiling {
            return Err(EncodingError::MalformedEncoding(format!(
                "cost {cost} is outside {}..={ceiling}",
                BCRYPT_COST_RANGE.start()
            )));
        }
        let salt: [u8; BCRYPT_SALT_LEN] = parts.salt.as_slice().try_into().map_err(|_| {
            EncodingError::MalformedEncoding(format!("salt must be {BCRYPT_SALT_LEN} bytes"))
        })?;
        if parts.digest.len() != BCRYPT_DIGEST_LEN {
            return Err(EncodingError::MalformedEncoding(format!(
                "digest must be {BCRYPT_DIGEST_LEN} bytes"
            )));
        }

        let computed = hash(cost, salt, plaintext);
        Ok(digests_match(&parts.digest, &computed))
    }

    fn needs_upgrade(&self, encoded: &EncodedCredential) -> Result<bool, EncodingError> {
        let parts = EncodedParts::parse(encoded, SchemeTag::Iterated, 1)?;
        Ok(parts.param(0, "cost")? < self.config.cost())
    }
}
