use std::ops::RangeInclusive;

use serde::Serialize;

use crate::domain::error::EncodingError;

/// Cost factor forced for the iterated scheme (2^12 rounds).
pub const DEFAULT_BCRYPT_COST: u32 = 12;
pub const BCRYPT_COST_RANGE: RangeInclusive<u32> = 4..=31;
/// Fixed salt and digest sizes of the iterated scheme.
pub const BCRYPT_SALT_LEN: usize = 16;
pub const BCRYPT_DIGEST_LEN: usize = 24;

pub const DEFAULT_ARGON2_SALT_LEN: u32 = 16;
pub const DEFAULT_ARGON2_HASH_LEN: u32 = 32;
pub const DEFAULT_ARGON2_PARALLELISM: u32 = 1;
pub const DEFAULT_ARGON2_MEMORY_KIB: u32 = 64 * 1024;
pub const DEFAULT_ARGON2_ITERATIONS: u32 = 3;

pub const ARGON2_SALT_LEN_RANGE: RangeInclusive<u32> = 16..=64;
pub const ARGON2_HASH_LEN_RANGE: RangeInclusive<u32> = 16..=64;
pub const ARGON2_PARALLELISM_RANGE: RangeInclusive<u32> = 1..=16;
/// 19 MiB floor, 4 GiB ceiling
pub const ARGON2_MEMORY_KIB_RANGE: RangeInclusive<u32> = 19 * 1024..=4 * 1024 * 1024;
pub const ARGON2_ITERATIONS_RANGE: RangeInclusive<u32> = 1..=16;

fn check_range(
    name: &str,
    value: u32,
    range: &RangeInclusive<u32>,
) -> Result<(), EncodingError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(EncodingError::Configuration(format!(
            "{name} must be within {}..={}, got {value}",
            range.start(),
            range.end()
        )))
    }
}

/// Parameters of the iterated block-cipher scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BcryptConfig {
    cost: u32,
}

impl BcryptConfig {
    pub fn new(cost: u32) -> Result<Self, EncodingError> {
        check_range("bcrypt cost", cost, &BCRYPT_COST_RANGE)?;
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptConfig {
    fn default() -> Self {
        Self {
            cost: DEFAULT_BCRYPT_COST,
        }
    }
}

/// Parameters of the memory-hard scheme.
///
/// All five values are fixed at construction; see the `ARGON2_*_RANGE`
/// constants for the accepted bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Argon2Config {
    salt_length: u32,
    hash_length: u32,
    parallelism: u32,
    memory_kib: u32,
    iterations: u32,
}

impl Argon2Config {
    pub fn new(
        salt_length: u32,
        hash_length: u32,
        parallelism: u32,
        memory_kib: u32,
        iterations: u32,
    ) -> Result<Self, EncodingError> {
        check_range("argon2 salt length", salt_length, &ARGON2_SALT_LEN_RANGE)?;
        check_range("argon2 hash length", hash_length, &ARGON2_HASH_LEN_RANGE)?;
        check_range("argon2 parallelism", parallelism, &ARGON2_PARALLELISM_RANGE)?;
        check_range("argon2 memory (KiB)", memory_kib, &ARGON2_MEMORY_KIB_RANGE)?;
        check_range("argon2 iterations", iterations, &ARGON2_ITERATIONS_RANGE)?;

        Ok(Self {
            salt_length,
            hash_length,
            parallelism,
            memory_kib,
            iterations,
        })
    }

    pub fn salt_length(&self) -> u32 {
        self.salt_length
    }

    pub fn hash_length(&self) -> u32 {
        self.hash_length
    }

    pub fn parallelism(&self) -> u32 {
        self.parallelism
    }

    pub fn memory_kib(&self) -> u32 {
        self.memory_kib
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            salt_length: DEFAULT_ARGON2_SALT_LEN,
            hash_length: DEFAULT_ARGON2_HASH_LEN,
            parallelism: DEFAULT_ARGON2_PARALLELISM,
            memory_kib: DEFAULT_ARGON2_MEMORY_KIB,
            iterations: DEFAULT_ARGON2_ITERATIONS,
        }
    }
}
