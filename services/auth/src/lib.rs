//! Authentication for the SoundWave backend
//!
//! Credential storage with Argon2 password hashes and stateless HS256
//! session tokens.

pub mod error;
pub mod jwt;
pub mod models;
pub mod repositories;
pub mod validation;

pub use error::{AuthError, AuthResult};
pub use jwt::{JwtConfig, JwtService, TokenError};
pub use repositories::UserRepository;
