use std::{collections::HashMap, sync::Arc};

use crate::domain::{
    error::EncodingError,
    models::encoded_credential::{EncodedCredential, SchemeTag},
    services::encoding_strategy::EncodingStrategy,
};

struct RegisteredStrategy {
    strategy: Arc<dyn EncodingStrategy>,
    encode_eligible: bool,
}

/// Scheme tag -> strategy mapping with one designated default for new encodings.
///
/// Verification dispatches on the tag embedded in the stored encoding, so
/// schemes that are no longer used for encoding stay verifiable as long as
/// they remain registered.
pub struct StrategyRegistry {
    strategies: HashMap<SchemeTag, RegisteredStrategy>,
    default_scheme: SchemeTag,
}

impl StrategyRegistry {
    pub fn builder() -> StrategyRegistryBuilder {
        StrategyRegistryBuilder::default()
    }

    /// Strategy used for every new encoding
    pub fn default(&self) -> &dyn EncodingStrategy {
        // `build` guarantees the default is registered
        self.strategies[&self.default_scheme].strategy.as_ref()
    }

    pub fn default_scheme(&self) -> SchemeTag {
        self.default_scheme
    }

    /// Strategy for `scheme` when it may still produce new encodings
    pub fn encoder(&self, scheme: SchemeTag) -> Result<&dyn EncodingStrategy, EncodingError> {
        match self.strategies.get(&scheme) {
            Some(entry) if entry.encode_eligible => Ok(entry.strategy.as_ref()),
            Some(_) => Err(EncodingError::UnknownScheme(format!(
                "{scheme} is registered for verification only"
            ))),
            None => Err(EncodingError::UnknownScheme(scheme.to_string())),
        }
    }

    /// Any registered strategy, including verify-only ones
    pub fn strategy(&self, scheme: SchemeTag) -> Option<&dyn EncodingStrategy> {
        self.strategies
            .get(&scheme)
            .map(|entry| entry.strategy.as_ref())
    }

    /// Registered tags in a stable order
    pub fn schemes(&self) -> Vec<SchemeTag> {
        let mut schemes: Vec<SchemeTag> = self.strategies.keys().copied().collect();
        schemes.sort();
        schemes
    }

    pub fn encode(&self, plaintext: &str) -> Result<EncodedCredential, EncodingError> {
        self.default().encode(plaintext)
    }

    /// Dispatches to the strategy named by the encoding's scheme tag.
    ///
    /// Fails with `UnknownScheme` if no strategy is registered for the tag and
    /// with `MalformedEncoding` if the encoding cannot be parsed.
    pub fn verify(
        &self,
        plaintext: &str,
        encoded: &EncodedCredential,
    ) -> Result<bool, EncodingError> {
        self.resolve(encoded)?.matches(plaintext, encoded)
    }

    /// Like [`verify`](Self::verify), with every failure reported as a mismatch.
    pub fn check(&self, plaintext: &str, encoded: &EncodedCredential) -> bool {
        self.verify(plaintext, encoded).unwrap_or(false)
    }

    /// True when `encoded` should be re-encoded with the default strategy:
    /// it uses another scheme, or weaker parameters than currently configured.
    pub fn needs_upgrade(&self, encoded: &EncodedCredential) -> Result<bool, EncodingError> {
        let strategy = self.resolve(encoded)?;
        if strategy.scheme() != self.default_scheme {
            return Ok(true);
        }
        strategy.needs_upgrade(encoded)
    }

    fn resolve(
        &self,
        encoded: &EncodedCredential,
    ) -> Result<&dyn EncodingStrategy, EncodingError> {
        let scheme = encoded.scheme()?;
        self.strategy(scheme)
            .ok_or_else(|| EncodingError::UnknownScheme(scheme.to_string()))
    }
}

#[derive(Default)]
pub struct StrategyRegistryBuilder {
    strategies: HashMap<SchemeTag, RegisteredStrategy>,
    duplicates: Vec<SchemeTag>,
    default_scheme: Option<SchemeTag>,
}

impl StrategyRegistryBuilder {
    /// Register a strategy for both encoding and verification
    pub fn register<S: EncodingStrategy + 'static>(self, strategy: S) -> Self {
        self.insert(Arc::new(strategy), true)
    }

    /// Register a legacy strategy that may only verify existing encodings
    pub fn register_verify_only<S: EncodingStrategy + 'static>(self, strategy: S) -> Self {
        self.insert(Arc::new(strategy), false)
    }

    pub fn default_scheme(mut self, scheme: SchemeTag) -> Self {
        self.default_scheme = Some(scheme);
        self
    }

    pub fn build(self) -> Result<StrategyRegistry, EncodingError> {
        if let Some(scheme) = self.duplicates.first() {
            return Err(EncodingError::Configuration(format!(
                "scheme {scheme} registered more than once"
            )));
        }

        let default_scheme = self.default_scheme.ok_or_else(|| {
            EncodingError::Configuration("no default scheme selected".to_string())
        })?;
        match self.strategies.get(&default_scheme) {
            Some(entry) if entry.encode_eligible => {}
            Some(_) => {
                return Err(EncodingError::Configuration(format!(
                    "default scheme {default_scheme} is registered for verification only"
                )));
            }
            None => {
                return Err(EncodingError::Configuration(format!(
                    "default scheme {default_scheme} is not registered"
                )));
            }
        }

        Ok(StrategyRegistry {
            strategies: self.strategies,
            default_scheme,
        })
    }

    fn insert(mut self, strategy: Arc<dyn EncodingStrategy>, encode_eligible: bool) -> Self {
        let scheme = strategy.scheme();
        let entry = RegisteredStrategy {
            strategy,
            encode_eligible,
        };
        if self.strategies.insert(scheme, entry).is_some() {
            self.duplicates.push(scheme);
        }
        self
    }
}
