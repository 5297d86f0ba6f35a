use keepnote::{config::AuthConfig, db, repositories, routes::api_router, services, AppState};

use repositories::{
    note_repository::SqliteNoteRepository, user_repository::SqliteUserRepository,
};
use services::{
    auth_service::AuthService, note_service::NoteService,
    pending_registrations::PendingRegistrationStore, registration_service::RegistrationService,
    token_service::TokenService,
};
use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keepnote=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let pool = db::create_pool().await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;

    let auth_config = AuthConfig::from_env();

    // Initialize repositories
    let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
    let note_repository = Arc::new(SqliteNoteRepository::new(pool.clone()));

    // Initialize services
    let email_service = services::create_email_service();
    let pending_registrations = Arc::new(PendingRegistrationStore::new(auth_config.otp_ttl));
    let registration_service = Arc::new(RegistrationService::new(
        user_repository.clone(),
        pending_registrations,
        email_service,
    ));
    let auth_service = Arc::new(AuthService::new(user_repository.clone()));
    let note_service = Arc::new(NoteService::new(note_repository));
    let token_service = Arc::new(TokenService::new(
        &auth_config.token_secret,
        auth_config.token_ttl,
    ));

    // Create app state
    let app_state = AppState {
        registration_service,
        auth_service,
        note_service,
        token_service,
        user_repository: user_repository as Arc<dyn repositories::UserRepository>,
        pool: pool.clone(),
    };

    let app = api_router(app_state);

    // Start server
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()?;

    let addr = SocketAddr::from((host.parse::<std::net::IpAddr>()?, port));

    tracing::info!("Server running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
