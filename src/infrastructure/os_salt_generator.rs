use rand_core::{OsRng, TryRngCore};

use crate::domain::{error::EncodingError, services::encoding_strategy::SaltGenerator};

/// Salt source backed by the operating system CSPRNG.
///
/// Failure is reported as `EncodingError::Entropy`; there is no fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsSaltGenerator;

impl SaltGenerator for OsSaltGenerator {
    fn fill(&self, salt: &mut [u8]) -> Result<(), EncodingError> {
        OsRng
            .try_fill_bytes(salt)
            .map_err(|e| EncodingError::Entropy(e.to_string()))
    }
}
