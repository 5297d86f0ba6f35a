pub mod test_helpers {
    use crate::repositories::{
        note_repository::SqliteNoteRepository, user_repository::SqliteUserRepository,
    };
    use crate::services::{
        auth_service::AuthService,
        email_service::{EmailError, EmailService},
        note_service::NoteService,
        pending_registrations::PendingRegistrationStore,
        registration_service::RegistrationService,
        token_service::TokenService,
    };
    use crate::{repositories, routes::api_router, AppState};
    use async_trait::async_trait;
    use chrono::{SecondsFormat, Utc};
    use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
    use std::sync::{Arc, Mutex};

    /// Signing secret used by every test app, so tests can mint their own
    /// tokens against the same key the server verifies with.
    pub const TEST_TOKEN_SECRET: &str = "test-secret";

    /// Create a new in-memory SQLite database for testing
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }

    /// Insert a verified-or-not user with a properly hashed password
    pub async fn insert_test_user(
        pool: &SqlitePool,
        email: &str,
        password: &str,
        verified: bool,
    ) -> Result<i64, sqlx::Error> {
        use argon2::{
            password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
            Argon2,
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                sqlx::Error::Configuration(format!("Password hashing failed: {}", e).into())
            })?
            .to_string();

        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let result = sqlx::query(
            "INSERT INTO users (email, password_hash, is_verified, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(email)
        .bind(password_hash)
        .bind(verified)
        .bind(created_at)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Captures every OTP email instead of sending it, so a test can read
    /// the code the way a user would read their inbox.
    #[derive(Default)]
    pub struct RecordingEmailService {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingEmailService {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn last_otp_for(&self, email: &str) -> Option<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|(to, _)| to == email)
                .map(|(_, otp)| otp.clone())
        }

        pub fn sent_count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl EmailService for RecordingEmailService {
        async fn send_otp_email(&self, to_email: &str, otp: &str) -> Result<(), EmailError> {
            self.sent
                .lock()
                .unwrap()
                .push((to_email.to_string(), otp.to_string()));
            Ok(())
        }
    }

    /// A fully wired application over an in-memory database, plus handles
    /// into the parts a test needs to observe or manipulate.
    pub struct TestApp {
        pub router: axum::Router,
        pub state: AppState,
        pub pending: Arc<PendingRegistrationStore>,
        pub emails: Arc<RecordingEmailService>,
    }

    pub async fn create_test_app() -> TestApp {
        create_test_app_with_otp_ttl(chrono::Duration::seconds(300)).await
    }

    /// Variant with a custom OTP lifetime, for expiry tests.
    pub async fn create_test_app_with_otp_ttl(otp_ttl: chrono::Duration) -> TestApp {
        let pool = create_test_db().await.expect("test database");

        let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
        let note_repository = Arc::new(SqliteNoteRepository::new(pool.clone()));

        let emails = Arc::new(RecordingEmailService::new());
        let pending = Arc::new(PendingRegistrationStore::new(otp_ttl));
        let registration_service = Arc::new(RegistrationService::new(
            user_repository.clone(),
            pending.clone(),
            emails.clone(),
        ));
        let auth_service = Arc::new(AuthService::new(user_repository.clone()));
        let note_service = Arc::new(NoteService::new(note_repository));
        let token_service = Arc::new(TokenService::new(
            TEST_TOKEN_SECRET,
            chrono::Duration::hours(24),
        ));

        let state = AppState {
            registration_service,
            auth_service,
            note_service,
            token_service,
            user_repository: user_repository as Arc<dyn repositories::UserRepository>,
            pool,
        };

        TestApp {
            router: api_router(state.clone()),
            state,
            pending,
            emails,
        }
    }
}

// Re-export commonly used test functions at module level for convenience
// Note: This is test-only code. Panic on error is acceptable in tests.
#[cfg(test)]
pub async fn create_test_pool() -> sqlx::SqlitePool {
    match test_helpers::create_test_db().await {
        Ok(pool) => pool,
        Err(e) => panic!("Failed to create test pool: {}", e),
    }
}

#[cfg(test)]
pub async fn create_test_user(
    pool: &sqlx::SqlitePool,
    email: &str,
    password: &str,
) -> Result<i64, sqlx::Error> {
    test_helpers::insert_test_user(pool, email, password, true).await
}
