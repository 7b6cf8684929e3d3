//! Common library for the SoundWave backend
//!
//! This crate provides shared functionality used across the services,
//! including configuration, database connectivity, per-user storage
//! namespaces and error handling.

pub mod config;
pub mod database;
pub mod error;
pub mod namespace;

pub use config::AppConfig;
pub use namespace::NamespaceManager;

/// Example usage of the database module
///
/// ```rust,no_run
/// use common::{AppConfig, database::{health_check, init_pool, init_schema}};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = AppConfig::load()?;
///     let pool = init_pool(&config.database()).await?;
///     init_schema(&pool).await?;
///     println!("Database health check: {}", health_check(&pool).await);
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
