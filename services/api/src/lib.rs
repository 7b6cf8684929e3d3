//! HTTP surface of the SoundWave backend

pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
