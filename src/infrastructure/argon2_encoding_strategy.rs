use std::{ops::RangeInclusive, sync::Arc};

use argon2::{Algorithm, Argon2, Params, Version};

use crate::{
    domain::{
        error::EncodingError,
        models::{
            encoded_credential::{EncodedCredential, EncodedParts, SchemeTag},
            strategy_config::Argon2Config,
        },
        services::encoding_strategy::{EncodingStrategy, SaltGenerator, digests_match},
    },
    infrastructure::os_salt_generator::OsSaltGenerator,
};

// Bounds for parameters read back from storage. Lengths and lower bounds
// are looser than at construction so older tunings still verify; cost
// ceilings keep one corrupt record from pinning a worker or the host memory.
// The memory ceiling is raised to the configured cost when that is higher.
const STORED_MEMORY_KIB_MAX: u32 = 1024 * 1024;
const STORED_ITERATIONS: RangeInclusive<u32> = 1..=16;
const STORED_PARALLELISM: RangeInclusive<u32> = 1..=16;
const STORED_SALT_LEN: RangeInclusive<usize> = 8..=64;
const STORED_DIGEST_LEN: RangeInclusive<usize> = 4..=64;

/// Memory-hard strategy (Argon2id, v0x13). Default for new encodings.
#[derive(Clone)]
pub struct Argon2EncodingStrategy {
    config: Argon2Config,
    salt_generator: Arc<dyn SaltGenerator>,
}

impl Argon2EncodingStrategy {
    pub fn new(config: Argon2Config) -> Self {
        Self::with_salt_generator(config, Arc::new(OsSaltGenerator))
    }

    pub fn with_salt_generator(
        config: Argon2Config,
        salt_generator: Arc<dyn SaltGenerator>,
    ) -> Self {
        Self {
            config,
            salt_generator,
        }
    }

    pub fn config(&self) -> &Argon2Config {
        &self.config
    }
}

impl Default for Argon2EncodingStrategy {
    fn default() -> Self {
        Self::new(Argon2Config::default())
    }
}

/// Cost parameters as written in an encoding
struct StoredParams {
    memory_kib: u32,
    iterations: u32,
    parallelism: u32,
}

impl StoredParams {
    fn read(parts: &EncodedParts<'_>, config: &Argon2Config) -> Result<Self, EncodingError> {
        let memory_kib = parts.param(0, "memory")?;
        let iterations = parts.param(1, "iterations")?;
        let parallelism = parts.param(2, "parallelism")?;

        let memory_ceiling = STORED_MEMORY_KIB_MAX.max(config.memory_kib());
        if memory_kib > memory_ceiling {
            return Err(EncodingError::MalformedEncoding(format!(
                "memory {memory_kib} KiB exceeds {memory_ceiling}"
            )));
        }
        if !STORED_ITERATIONS.contains(&iterations) {
            return Err(EncodingError::MalformedEncoding(format!(
                "iterations {iterations} out of range"
            )));
        }
        if !STORED_PARALLELISM.contains(&parallelism) {
            return Err(EncodingError::MalformedEncoding(format!(
                "parallelism {parallelism} out of range"
            )));
        }
        if !STORED_SALT_LEN.contains(&parts.salt.len()) {
            return Err(EncodingError::MalformedEncoding(format!(
                "salt length {} out of range",
                parts.salt.len()
            )));
        }
        if !STORED_DIGEST_LEN.contains(&parts.digest.len()) {
            return Err(EncodingError::MalformedEncoding(format!(
                "digest length {} out of range",
                parts.digest.len()
            )));
        }

        Ok(Self {
            memory_kib,
            iterations,
            parallelism,
        })
    }
}

fn derive(
    memory_kib: u32,
    iterations: u32,
    parallelism: u32,
    salt: &[u8],
    plaintext: &str,
    out: &mut [u8],
) -> Result<(), argon2::Error> {
    let params = Params::new(memory_kib, iterations, parallelism, Some(out.len()))?;
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params).hash_password_into(
        plaintext.as_bytes(),
        salt,
        out,
    )
}

impl EncodingStrategy for Argon2EncodingStrategy {
    fn scheme(&self) -> SchemeTag {
        SchemeTag::MemoryHard
    }

    fn encode(&self, plaintext: &str) -> Result<EncodedCredential, EncodingError> {
        let config = &self.config;
        let mut salt = vec![0u8; config.salt_length() as usize];
        self.salt_generator.fill(&mut salt)?;

        let mut digest = vec![0u8; config.hash_length() as usize];
        derive(
            config.memory_kib(),
            config.iterations(),
            config.parallelism(),
            &salt,
            plaintext,
            &mut digest,
        )
        .map_err(|e| EncodingError::Configuration(format!("argon2 rejected parameters: {e}")))?;

        Ok(EncodedParts::format(
            SchemeTag::MemoryHard,
            &[config.memory_kib(), config.iterations(), config.parallelism()],
            &salt,
            &digest,
        ))
    }

    fn matches(
        &self,
        plaintext: &str,
        encoded: &EncodedCredential,
    ) -> Result<bool, EncodingError> {
        let parts = EncodedParts::parse(encoded, SchemeTag::MemoryHard, 3)?;
        let stored = StoredParams::read(&parts, &self.config)?;

        let mut computed = vec![0u8; parts.digest.len()];
        derive(
            stored.memory_kib,
            stored.iterations,
            stored.parallelism,
            &parts.salt,
            plaintext,
            &mut computed,
        )
        .map_err(|e| EncodingError::MalformedEncoding(format!("unusable parameters: {e}")))?;

        Ok(digests_match(&parts.digest, &computed))
    }

    fn needs_upgrade(&self, encoded: &EncodedCredential) -> Result<bool, EncodingError> {
        let parts = EncodedParts::parse(encoded, SchemeTag::MemoryHard, 3)?;
        let stored = StoredParams::read(&parts, &self.config)?;
        let config = &self.config;

        Ok(stored.memory_kib < config.memory_kib()
            || stored.iterations < config.iterations()
            || stored.parallelism < config.parallelism()
            || parts.salt.len() < config.salt_length() as usize
            || parts.digest.len() < config.hash_length() as usize)
    }
}
