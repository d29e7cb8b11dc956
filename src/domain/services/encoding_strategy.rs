use subtle::ConstantTimeEq;

use crate::domain::{
    error::EncodingError,
    models::encoded_credential::{EncodedCredential, SchemeTag},
};

/// Contract shared by every credential hashing algorithm.
///
/// Implementations are stateless apart from their fixed configuration, so a
/// single instance can be shared across threads. Both operations are
/// CPU/memory bound and block the calling thread.
pub trait EncodingStrategy: Send + Sync {
    /// Tag written at the front of every encoding this strategy produces
    fn scheme(&self) -> SchemeTag;

    /// Hash a plaintext credential under a freshly generated salt
    fn encode(&self, plaintext: &str) -> Result<EncodedCredential, EncodingError>;

    /// Recompute the hash with the parameters embedded in `encoded` and
    /// compare in constant time.
    ///
    /// A well-formed encoding that does not match yields `Ok(false)`.
    fn matches(
        &self,
        plaintext: &str,
        encoded: &EncodedCredential,
    ) -> Result<bool, EncodingError>;

    /// Whether `encoded` was produced with weaker parameters than this
    /// strategy is configured with
    fn needs_upgrade(&self, encoded: &EncodedCredential) -> Result<bool, EncodingError>;
}

/// Source of salt bytes. Must be cryptographically secure and thread-safe.
pub trait SaltGenerator: Send + Sync {
    fn fill(&self, salt: &mut [u8]) -> Result<(), EncodingError>;
}

/// Compares two digests without short-circuiting on the first difference.
pub fn digests_match(expected: &[u8], actual: &[u8]) -> bool {
    bool::from(expected.ct_eq(actual))
}
