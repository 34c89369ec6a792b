//! CLI subcommand implementations.

pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use thiserror::Error;

/// Error shared by commands needing a database connection string.
#[derive(Debug, Error)]
#[error("Missing environment variable: FRECHNEL_DATABASE_URL")]
pub struct MissingDatabaseUrl;

/// Resolve the database URL with fallback to generic `DATABASE_URL`.
pub fn database_url() -> Result<SecretString, MissingDatabaseUrl> {
    std::env::var("FRECHNEL_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MissingDatabaseUrl)
}
