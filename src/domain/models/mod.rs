pub mod encoded_credential;
pub mod strategy_config;
pub mod user;
