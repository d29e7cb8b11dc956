//! Credential encoding: hash a plaintext credential into a self-describing
//! string with one of several schemes, and verify candidates against it.
//!
//! New encodings use the registry's default strategy (Argon2id). Stored
//! encodings from any registered strategy keep verifying, which is what lets
//! legacy bcrypt records coexist with the current scheme.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod usecase;

pub use crate::domain::{
    error::EncodingError,
    models::encoded_credential::{EncodedCredential, SchemeTag},
    services::{encoding_strategy::EncodingStrategy, strategy_registry::StrategyRegistry},
};

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use rstest::*;

    use crate::{
        domain::models::strategy_config::{Argon2Config, BcryptConfig},
        infrastructure::{
            argon2_encoding_strategy::Argon2EncodingStrategy,
            bcrypt_encoding_strategy::BcryptEncodingStrategy,
        },
        *,
    };

    fn argon2() -> Argon2EncodingStrategy {
        Argon2EncodingStrategy::new(Argon2Config::new(16, 32, 1, 19 * 1024, 1).unwrap())
    }

    fn bcrypt() -> BcryptEncodingStrategy {
        BcryptEncodingStrategy::new(BcryptConfig::new(4).unwrap())
    }

    #[fixture]
    fn registry() -> StrategyRegistry {
        StrategyRegistry::builder()
            .register(argon2())
            .register_verify_only(bcrypt())
            .default_scheme(SchemeTag::MemoryHard)
            .build()
            .unwrap()
    }

    #[rstest]
    fn test_cross_strategy_encodings_are_rejected_not_crashed() {
        let memory_hard = argon2();
        let iterated = bcrypt();
        let from_memory_hard = memory_hard.encode("mi_password_seguro").unwrap();
        let from_iterated = iterated.encode("mi_password_seguro").unwrap();

        assert!(matches!(
            iterated.matches("mi_password_seguro", &from_memory_hard),
            Err(EncodingError::MalformedEncoding(_))
        ));
        assert!(matches!(
            memory_hard.matches("mi_password_seguro", &from_iterated),
            Err(EncodingError::MalformedEncoding(_))
        ));
    }

    #[rstest]
    fn test_registry_auto_dispatch_across_strategies(registry: StrategyRegistry) {
        let from_memory_hard = argon2().encode("mi_password_seguro").unwrap();
        let from_iterated = bcrypt().encode("mi_password_seguro").unwrap();

        for encoded in [&from_memory_hard, &from_iterated] {
            assert!(registry.verify("mi_password_seguro", encoded).unwrap());
            assert!(!registry.verify("wrong_password", encoded).unwrap());
        }
    }

    #[rstest]
    fn test_registry_check_normalizes_malformed(registry: StrategyRegistry) {
        let garbage = EncodedCredential::new("not-a-valid-encoding".to_string());
        assert!(!registry.check("mi_password_seguro", &garbage));
    }

    #[rstest]
    fn test_distinct_plaintexts_do_not_match(registry: StrategyRegistry) {
        let plaintexts = ["alpha", "alpha ", "Alpha", "beta", "mi_password_seguro"];
        let encodings: Vec<EncodedCredential> = plaintexts
            .iter()
            .map(|p| registry.encode(p).unwrap())
            .collect();

        for (i, encoded) in encodings.iter().enumerate() {
            for (j, candidate) in plaintexts.iter().enumerate() {
                assert_eq!(registry.verify(candidate, encoded).unwrap(), i == j);
            }
        }
    }

    #[rstest]
    fn test_shared_registry_across_threads(registry: StrategyRegistry) {
        let registry = Arc::new(registry);

        thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|n| {
                    let registry = Arc::clone(&registry);
                    scope.spawn(move || {
                        let plaintext = format!("password-{n}");
                        let encoded = registry.encode(&plaintext).unwrap();
                        (plaintext, encoded)
                    })
                })
                .collect();

            for handle in handles {
                let (plaintext, encoded) = handle.join().unwrap();
                assert!(registry.verify(&plaintext, &encoded).unwrap());
            }
        });
    }
}
