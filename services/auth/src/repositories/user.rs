//! User repository for database operations

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use common::NamespaceManager;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::{
    error::{AuthError, AuthResult},
    models::{LoginCredentials, NewUser, User},
    validation::{validate_password, validate_username},
};

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
    namespaces: NamespaceManager,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool, namespaces: NamespaceManager) -> Self {
        Self { pool, namespaces }
    }

    /// Create a new user together with their storage folder
    ///
    /// The row is only committed once the folder exists, so a failed folder
    /// creation leaves no user behind.
    pub async fn create(&self, new_user: &NewUser) -> AuthResult<User> {
        validate_username(&new_user.username).map_err(AuthError::Validation)?;
        validate_password(&new_user.password).map_err(AuthError::Validation)?;

        info!("Creating new user: {}", new_user.username);

        // Hash the password
        let salt = SaltString::generate(&mut rand::thread_rng());
        let password_hash = Argon2::default()
            .hash_password(new_user.password.as_bytes(), &salt)
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?
            .to_string();

        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES (?, ?)
            RETURNING id, username, password_hash
            "#,
        )
        .bind(&new_user.username)
        .bind(&password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => AuthError::AlreadyExists,
            e => AuthError::Database(e),
        })?;

        self.namespaces.ensure(&user.username).await?;
        tx.commit().await?;

        Ok(user)
    }

    /// Check a username/password pair
    ///
    /// Unknown users and wrong passwords both yield `InvalidCredentials`.
    pub async fn authenticate(&self, credentials: &LoginCredentials) -> AuthResult<User> {
        let Some(user) = self.find_by_username(&credentials.username).await? else {
            info!("Login attempt for unknown user: {}", credentials.username);
            return Err(AuthError::InvalidCredentials);
        };

        if !Self::verify_password(&user, &credentials.password) {
            info!("Wrong password for user: {}", user.username);
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Find a user by username
    pub async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: i64) -> AuthResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Verify a user's password
    pub fn verify_password(user: &User, password: &str) -> bool {
        let parsed_hash = match PasswordHash::new(&user.password_hash) {
            Ok(hash) => hash,
            Err(e) => {
                warn!("Stored hash for {} is unreadable: {}", user.username, e);
                return false;
            }
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::database::{DatabaseConfig, init_pool, init_schema};
    use tempfile::TempDir;

    async fn repository_in(root: &std::path::Path) -> UserRepository {
        let pool = init_pool(&DatabaseConfig {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            connection_timeout: 5,
        })
        .await
        .unwrap();
        init_schema(&pool).await.unwrap();

        UserRepository::new(pool, NamespaceManager::new(root))
    }

    fn new_user(username: &str, password: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    fn credentials(username: &str, password: &str) -> LoginCredentials {
        LoginCredentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_then_authenticate() {
        let dir = TempDir::new().unwrap();
        let repo = repository_in(dir.path()).await;

        let created = repo.create(&new_user("alice", "pw123")).await.unwrap();
        assert_ne!(created.password_hash, "pw123");
        assert!(dir.path().join("alice").is_dir());

        let user = repo.authenticate(&credentials("alice", "pw123")).await.unwrap();
        assert_eq!(user.id, created.id);
        assert_eq!(repo.find_by_id(created.id).await.unwrap().unwrap().username, "alice");
    }

    #[tokio::test]
    async fn test_duplicate_username_keeps_original_credential() {
        let dir = TempDir::new().unwrap();
        let repo = repository_in(dir.path()).await;

        let original = repo.create(&new_user("alice", "pw123")).await.unwrap();
        let second = repo.create(&new_user("alice", "other")).await;
        assert!(matches!(second, Err(AuthError::AlreadyExists)));

        let stored = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(stored.password_hash, original.password_hash);
        assert!(repo.authenticate(&credentials("alice", "pw123")).await.is_ok());
        assert!(repo.authenticate(&credentials("alice", "other")).await.is_err());
    }

    #[tokio::test]
    async fn test_usernames_differing_only_in_case_collide() {
        let dir = TempDir::new().unwrap();
        let repo = repository_in(dir.path()).await;

        repo.create(&new_user("alice", "pw123")).await.unwrap();
        let result = repo.create(&new_user("Alice", "other")).await;
        assert!(matches!(result, Err(AuthError::AlreadyExists)));

        let stored = repo.find_by_username("ALICE").await.unwrap().unwrap();
        assert_eq!(stored.username, "alice");
        assert!(dir.path().join("alice").is_dir());
    }

    #[tokio::test]
    async fn test_bad_credentials_are_indistinguishable() {
        let dir = TempDir::new().unwrap();
        let repo = repository_in(dir.path()).await;
        repo.create(&new_user("alice", "pw123")).await.unwrap();

        let wrong_password = repo.authenticate(&credentials("alice", "nope")).await;
        let unknown_user = repo.authenticate(&credentials("mallory", "pw123")).await;

        assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));
        assert!(matches!(unknown_user, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_invalid_username_is_rejected() {
        let dir = TempDir::new().unwrap();
        let repo = repository_in(dir.path()).await;

        let result = repo.create(&new_user("../escape", "pw123")).await;
        assert!(matches!(result, Err(AuthError::Validation(_))));
        assert!(repo.find_by_username("../escape").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_folder_creation_rolls_back() {
        let dir = TempDir::new().unwrap();
        // A regular file where the storage root should be
        let blocked = dir.path().join("blocked");
        std::fs::write(&blocked, b"").unwrap();
        let repo = repository_in(&blocked).await;

        let result = repo.create(&new_user("alice", "pw123")).await;
        assert!(matches!(result, Err(AuthError::Namespace(_))));
        assert!(repo.find_by_username("alice").await.unwrap().is_none());
    }
}
