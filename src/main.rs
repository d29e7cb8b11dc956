use std::{error::Error, sync::Arc};

use sea_orm::{ConnectOptions, Database};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use credential_encoding::{
    config::AppConfig,
    domain::{
        error::{DomainError, EncodingError, RepositoryError},
        models::{
            encoded_credential::{EncodedCredential, SchemeTag},
            user::{UserId, Username},
        },
        repositories::user_repository::UserRepository,
        services::strategy_registry::StrategyRegistry,
    },
    infrastructure::{
        in_memory_user_repository::InMemoryUserRepository, user_repository::PostgresUserRepository,
    },
    usecase::{login_usecase::LoginUsecase, register_user_usecase::RegisterUserUsecase},
};

const LAB_PASSWORD: &str = "mi_password_seguro";
const WRONG_PASSWORD: &str = "wrong_password";

#[derive(Serialize)]
struct LabReport {
    default_scheme: SchemeTag,
    schemes: Vec<SchemeTag>,
    accounts: Vec<AccountReport>,
    logins: Vec<LoginReport>,
}

#[derive(Serialize)]
struct AccountReport {
    username: String,
    scheme: SchemeTag,
    encoded_credential: EncodedCredential,
}

#[derive(Serialize)]
struct LoginReport {
    username: String,
    correct_password: bool,
    verified: bool,
    needs_upgrade: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::from_env()?;
    let registry = Arc::new(config.build_registry()?);
    tracing::info!(
        default_scheme = %registry.default_scheme(),
        schemes = ?registry.schemes(),
        "credential strategies ready"
    );

    let report = match &config.database_url {
        Some(url) => {
            let mut opt = ConnectOptions::new(url.clone());
            opt.max_connections(10)
                .min_connections(1)
                .sqlx_logging(false);
            let db = Database::connect(opt).await?;
            let repository = PostgresUserRepository::new(db);
            repository.ensure_schema().await?;
            tracing::info!("storing accounts in PostgreSQL");
            run_lab(repository, registry).await?
        }
        None => {
            tracing::info!("DATABASE_URL not set, storing accounts in memory");
            run_lab(InMemoryUserRepository::new(), registry).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Stores `admin_user` with the default scheme and `guest_user` with a
/// legacy iterated encoding, then exercises logins against both.
async fn run_lab<R>(
    repository: R,
    registry: Arc<StrategyRegistry>,
) -> Result<LabReport, Box<dyn Error>>
where
    R: UserRepository + Clone + Send + Sync,
{
    let register_usecase = RegisterUserUsecase::new(repository.clone(), Arc::clone(&registry));
    let login_usecase = LoginUsecase::new(repository.clone(), Arc::clone(&registry))?;
    let mut accounts = Vec::new();

    match register_usecase
        .register("admin_user".to_string(), LAB_PASSWORD.to_string(), None)
        .await
    {
        Ok(result) => accounts.push(AccountReport {
            username: result.username.as_str().to_string(),
            scheme: result.scheme,
            encoded_credential: result.encoded_credential,
        }),
        Err(DomainError::Repository(RepositoryError::Conflict(_))) => {
            tracing::info!(username = "admin_user", "account already stored, reusing it");
        }
        Err(e) => return Err(e.into()),
    }

    let guest = Username::new("guest_user".to_string())?;
    let legacy_registry = Arc::clone(&registry);
    let legacy = tokio::task::spawn_blocking(move || -> Result<EncodedCredential, EncodingError> {
        legacy_registry
            .strategy(SchemeTag::Iterated)
            .ok_or_else(|| EncodingError::UnknownScheme(SchemeTag::Iterated.to_string()))?
            .encode(LAB_PASSWORD)
    })
    .await??;
    match repository.save(UserId::new(), &guest, &legacy).await {
        Ok(()) => accounts.push(AccountReport {
            username: guest.as_str().to_string(),
            scheme: SchemeTag::Iterated,
            encoded_credential: legacy,
        }),
        Err(RepositoryError::Conflict(_)) => {
            tracing::info!(username = "guest_user", "account already stored, reusing it");
        }
        Err(e) => return Err(e.into()),
    }

    let mut logins = Vec::new();
    for username in ["admin_user", "guest_user"] {
        for (password, correct_password) in [(LAB_PASSWORD, true), (WRONG_PASSWORD, false)] {
            let outcome = login_usecase
                .login(username.to_string(), password.to_string())
                .await;
            let (verified, needs_upgrade) = match outcome {
                Ok(result) => (true, result.needs_upgrade),
                Err(DomainError::AuthenticationFailed) => (false, false),
                Err(e) => return Err(e.into()),
            };
            logins.push(LoginReport {
                username: username.to_string(),
                correct_password,
                verified,
                needs_upgrade,
            });
        }
    }

    Ok(LabReport {
        default_scheme: registry.default_scheme(),
        schemes: registry.schemes(),
        accounts,
        logins,
    })
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use credential_encoding::{
        domain::models::strategy_config::{Argon2Config, BcryptConfig},
        infrastructure::{
            argon2_encoding_strategy::Argon2EncodingStrategy,
            bcrypt_encoding_strategy::BcryptEncodingStrategy,
        },
    };

    use super::*;

    #[fixture]
    fn registry() -> Arc<StrategyRegistry> {
        let argon2 = Argon2Config::new(16, 32, 1, 19 * 1024, 1).unwrap();
        Arc::new(
            StrategyRegistry::builder()
                .register(Argon2EncodingStrategy::new(argon2))
                .register_verify_only(BcryptEncodingStrategy::new(BcryptConfig::new(4).unwrap()))
                .default_scheme(SchemeTag::MemoryHard)
                .build()
                .unwrap(),
        )
    }

    fn login_rows(report: &LabReport) -> Vec<(&str, bool, bool, bool)> {
        report
            .logins
            .iter()
            .map(|row| {
                (
                    row.username.as_str(),
                    row.correct_password,
                    row.verified,
                    row.needs_upgrade,
                )
            })
            .collect()
    }

    const EXPECTED_LOGINS: [(&str, bool, bool, bool); 4] = [
        ("admin_user", true, true, false),
        ("admin_user", false, false, false),
        // iterated encodings verify but are flagged for re-encoding
        ("guest_user", true, true, true),
        ("guest_user", false, false, false),
    ];

    #[rstest]
    #[tokio::test]
    async fn test_run_lab_stores_both_schemes(registry: Arc<StrategyRegistry>) {
        let report = run_lab(InMemoryUserRepository::new(), registry)
            .await
            .unwrap();

        assert_eq!(report.default_scheme, SchemeTag::MemoryHard);
        assert_eq!(report.schemes, vec![SchemeTag::Iterated, SchemeTag::MemoryHard]);

        let accounts: Vec<(&str, SchemeTag)> = report
            .accounts
            .iter()
            .map(|account| (account.username.as_str(), account.scheme))
            .collect();
        assert_eq!(
            accounts,
            vec![
                ("admin_user", SchemeTag::MemoryHard),
                ("guest_user", SchemeTag::Iterated),
            ]
        );
        assert!(
            report.accounts[0]
                .encoded_credential
                .as_str()
                .starts_with("v1-memhard$19456$1$1$")
        );
        assert!(
            report.accounts[1]
                .encoded_credential
                .as_str()
                .starts_with("v1-iterated$4$")
        );

        assert_eq!(login_rows(&report), EXPECTED_LOGINS);
    }

    #[rstest]
    #[tokio::test]
    async fn test_run_lab_reuses_stored_accounts(registry: Arc<StrategyRegistry>) {
        let repository = InMemoryUserRepository::new();
        run_lab(repository.clone(), Arc::clone(&registry))
            .await
            .unwrap();

        let report = run_lab(repository, registry).await.unwrap();

        assert!(report.accounts.is_empty());
        assert_eq!(login_rows(&report), EXPECTED_LOGINS);
    }

    #[rstest]
    #[tokio::test]
    async fn test_report_serializes_scheme_tags(registry: Arc<StrategyRegistry>) {
        let report = run_lab(InMemoryUserRepository::new(), registry)
            .await
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["default_scheme"], "v1-memhard");
        assert_eq!(json["accounts"][1]["scheme"], "v1-iterated");
        assert_eq!(json["logins"].as_array().map(Vec::len), Some(4));
    }
}
