pub mod encoding_strategy;
pub mod strategy_registry;
