pub mod auth_service;
pub mod email_service;
pub mod note_service;
pub mod pending_registrations;
pub mod registration_service;
pub mod token_service;

pub use auth_service::{AuthService, AuthServiceError, Credentials};
pub use email_service::{
    create_email_service, EmailError, EmailService, MockEmailService, SmtpEmailService,
};
pub use note_service::NoteService;
pub use pending_registrations::{OtpError, PendingRegistration, PendingRegistrationStore};
pub use registration_service::{RegistrationError, RegistrationService};
pub use token_service::{Claims, TokenError, TokenService};
