pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub registration_service: Arc<services::registration_service::RegistrationService>,
    pub auth_service: Arc<services::auth_service::AuthService>,
    pub note_service: Arc<services::note_service::NoteService>,
    pub token_service: Arc<services::token_service::TokenService>,
    pub user_repository: Arc<dyn repositories::UserRepository>,
    pub pool: sqlx::SqlitePool,
}
