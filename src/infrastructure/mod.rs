pub mod argon2_encoding_strategy;
pub mod bcrypt_encoding_strategy;
pub mod entity;
pub mod in_memory_user_repository;
pub mod os_salt_generator;
pub mod user_repository;
