use crate::models::user::User;
use crate::repositories::user_repository::{RepositoryError, UserRepository};
use crate::services::email_service::EmailService;
use crate::services::pending_registrations::{OtpError, PendingRegistrationStore};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use rand::Rng;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("Email already registered")]
    EmailTaken,
    #[error(transparent)]
    Otp(#[from] OtpError),
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

pub struct RegistrationService {
    user_repository: Arc<dyn UserRepository>,
    pending: Arc<PendingRegistrationStore>,
    email_service: Arc<dyn EmailService>,
}

impl RegistrationService {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        pending: Arc<PendingRegistrationStore>,
        email_service: Arc<dyn EmailService>,
    ) -> Self {
        Self {
            user_repository,
            pending,
            email_service,
        }
    }

    fn generate_otp() -> String {
        let mut rng = rand::thread_rng();
        rng.gen_range(100_000..=999_999).to_string()
    }

    /// Starts (or restarts) a registration: stores the pending entry and
    /// dispatches the OTP email in the background. Re-registering the same
    /// email supersedes the earlier entry and its OTP.
    pub async fn register(&self, email: &str, password: &str) -> Result<(), RegistrationError> {
        if self.user_repository.find_by_email(email).await?.is_some() {
            return Err(RegistrationError::EmailTaken);
        }

        let otp = Self::generate_otp();
        self.pending.put(email, password, &otp);

        tracing::info!("Registration pending for {}, dispatching OTP email", email);

        // The response never waits for, or depends on, the send outcome;
        // a user whose email bounces only finds out by never receiving it.
        let email_service = self.email_service.clone();
        let to = email.to_string();
        tokio::spawn(async move {
            match email_service.send_otp_email(&to, &otp).await {
                Ok(_) => tracing::info!("✅ OTP email sent to {}", to),
                Err(e) => tracing::error!("❌ Failed to send OTP email to {}: {}", to, e),
            }
        });

        Ok(())
    }

    /// Promotes a pending registration to a verified user. The claim is
    /// atomic per email: a concurrent verification for the same address
    /// sees the entry already gone.
    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<User, RegistrationError> {
        let password = self.pending.claim(email, otp)?;

        let password_hash = Self::hash_password(&password)?;

        let user = self
            .user_repository
            .create_user(email, &password_hash, true)
            .await
            .map_err(|e| match e {
                RepositoryError::AlreadyExists => RegistrationError::EmailTaken,
                other => RegistrationError::Repository(other),
            })?;

        tracing::info!("Email {} verified, user {} created", email, user.id);

        Ok(user)
    }

    fn hash_password(password: &str) -> Result<String, RegistrationError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| RegistrationError::Hashing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::user_repository::MockUserRepository;
    use crate::services::email_service::MockEmailService;
    use mockall::predicate::*;

    fn build_service(
        mock_repo: MockUserRepository,
    ) -> (RegistrationService, Arc<PendingRegistrationStore>) {
        let pending = Arc::new(PendingRegistrationStore::new(chrono::Duration::seconds(300)));
        let service = RegistrationService::new(
            Arc::new(mock_repo),
            pending.clone(),
            Arc::new(MockEmailService::new()),
        );
        (service, pending)
    }

    #[tokio::test]
    async fn test_register_stores_six_digit_otp() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_find_by_email()
            .with(eq("a@x.com"))
            .times(1)
            .returning(|_| Box::pin(async move { Ok(None) }));

        let (service, pending) = build_service(mock_repo);

        service.register("a@x.com", "pw1").await.unwrap();

        let entry = pending.get("a@x.com").expect("pending entry stored");
        assert_eq!(entry.password, "pw1");
        assert_eq!(entry.otp.len(), 6);
        let code: u32 = entry.otp.parse().expect("numeric OTP");
        assert!((100_000..=999_999).contains(&code));
    }

    #[tokio::test]
    async fn test_register_existing_email_conflicts() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_find_by_email().times(1).returning(|_| {
            Box::pin(async move {
                Ok(Some(User {
                    id: 1,
                    email: "a@x.com".to_string(),
                    password_hash: "hash".to_string(),
                    is_verified: true,
                    created_at: "2025-06-01T12:00:00.000000Z".to_string(),
                }))
            })
        });

        let (service, pending) = build_service(mock_repo);

        let result = service.register("a@x.com", "pw1").await;
        assert!(matches!(result, Err(RegistrationError::EmailTaken)));
        // No pending entry is written for a conflicting email.
        assert!(pending.get("a@x.com").is_none());
    }

    #[tokio::test]
    async fn test_verify_otp_creates_verified_user() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_find_by_email()
            .times(1)
            .returning(|_| Box::pin(async move { Ok(None) }));
        mock_repo
            .expect_create_user()
            .withf(|email, hash, verified| {
                email == "a@x.com" && hash.starts_with("$argon2") && *verified
            })
            .times(1)
            .returning(|email, hash, verified| {
                let user = User {
                    id: 1,
                    email: email.to_string(),
                    password_hash: hash.to_string(),
                    is_verified: verified,
                    created_at: "2025-06-01T12:00:00.000000Z".to_string(),
                };
                Box::pin(async move { Ok(user) })
            });

        let (service, pending) = build_service(mock_repo);

        service.register("a@x.com", "pw1").await.unwrap();
        let otp = pending.get("a@x.com").unwrap().otp;

        let user = service.verify_otp("a@x.com", &otp).await.unwrap();
        assert_eq!(user.email, "a@x.com");
        assert!(user.is_verified);

        // The entry was consumed by the successful claim.
        assert!(pending.get("a@x.com").is_none());
    }

    #[tokio::test]
    async fn test_verify_otp_mismatch_keeps_entry() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_find_by_email()
            .times(1)
            .returning(|_| Box::pin(async move { Ok(None) }));

        let (service, pending) = build_service(mock_repo);

        service.register("a@x.com", "pw1").await.unwrap();

        // No create_user expectation is set: a mismatch must never reach
        // the repository.
        let result = service.verify_otp("a@x.com", "000000").await;
        assert!(matches!(
            result,
            Err(RegistrationError::Otp(OtpError::Mismatch))
        ));
        assert!(pending.get("a@x.com").is_some());
    }

    #[tokio::test]
    async fn test_verify_otp_without_registration() {
        let mock_repo = MockUserRepository::new();
        let (service, _pending) = build_service(mock_repo);

        let result = service.verify_otp("ghost@x.com", "123456").await;
        assert!(matches!(
            result,
            Err(RegistrationError::Otp(OtpError::NotFound))
        ));
    }
}
