use std::env;

use tracing::warn;

/// How long a pending registration's OTP stays valid.
pub const OTP_TTL_SECONDS: i64 = 300;

/// Lifetime of an issued bearer token.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Upper bound on request bodies. Inline data-URI images ride in the JSON
/// body, so this is effectively the image size cap.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Development fallback for the token signing secret. Tokens signed with
/// this value are forgeable by anyone who reads the source; production
/// deployments must set TOKEN_SECRET.
const DEFAULT_TOKEN_SECRET: &str = "keepnote-dev-secret-change-me";

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub token_secret: String,
    pub token_ttl: chrono::Duration,
    pub otp_ttl: chrono::Duration,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let token_secret = match env::var("TOKEN_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                warn!("TOKEN_SECRET not set; using built-in development secret");
                DEFAULT_TOKEN_SECRET.to_string()
            }
        };

        AuthConfig {
            token_secret,
            token_ttl: chrono::Duration::hours(TOKEN_TTL_HOURS),
            otp_ttl: chrono::Duration::seconds(OTP_TTL_SECONDS),
        }
    }
}
