//! Application state shared across handlers

use auth::{JwtConfig, JwtService, UserRepository};
use common::{AppConfig, NamespaceManager};
use media::{Downloader, DownloaderConfig, MetadataExtractor};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db_pool: SqlitePool,
    pub user_repository: UserRepository,
    pub jwt_service: JwtService,
    pub namespaces: NamespaceManager,
    pub metadata_extractor: MetadataExtractor,
    pub downloader: Downloader,
}

impl AppState {
    /// Wire every component from the configuration and a connected pool
    pub fn new(config: AppConfig, db_pool: SqlitePool) -> Self {
        let namespaces = NamespaceManager::new(&config.storage_root);

        Self {
            user_repository: UserRepository::new(db_pool.clone(), namespaces.clone()),
            jwt_service: JwtService::new(JwtConfig::from_app_config(&config)),
            metadata_extractor: MetadataExtractor::new(),
            downloader: Downloader::new(DownloaderConfig::from_app_config(&config)),
            namespaces,
            db_pool,
            config: Arc::new(config),
        }
    }
}
