use crate::error::{AppError, Result};
use crate::models::PublicUser;
use crate::services::auth_service::Credentials;
use crate::AppState;
use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

// Wire types use Option fields so a missing key maps to the documented 400
// instead of a serde rejection.

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: Option<String>,
    pub otp: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /api/register - Start a registration and email a verification code
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<Value>> {
    let (email, password) = match (request.email.as_deref(), request.password.as_deref()) {
        (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
            (email, password)
        }
        _ => {
            return Err(AppError::Validation(
                "Email and password are required".to_string(),
            ))
        }
    };

    state.registration_service.register(email, password).await?;

    Ok(Json(json!({ "message": "OTP sent to your email" })))
}

/// POST /api/verify-otp - Redeem the emailed code and create the account
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(request): Json<VerifyOtpRequest>,
) -> Result<Json<Value>> {
    let (email, otp) = match (request.email.as_deref(), request.otp.as_deref()) {
        (Some(email), Some(otp)) if !email.is_empty() && !otp.is_empty() => (email, otp),
        _ => {
            return Err(AppError::Validation(
                "Email and OTP are required".to_string(),
            ))
        }
    };

    state.registration_service.verify_otp(email, otp).await?;

    Ok(Json(json!({ "message": "Account verified successfully" })))
}

/// POST /api/login - Exchange credentials for a session token
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>> {
    // Missing fields are not rejected up front; they fail the credential
    // check and produce the same 401 as a wrong password.
    let credentials = Credentials {
        email: request.email.unwrap_or_default(),
        password: request.password.unwrap_or_default(),
    };

    let user = state.auth_service.authenticate(credentials).await?;
    let token = state.token_service.issue(user.id)?;

    Ok(Json(json!({
        "message": "Login successful",
        "token": token,
        "user": PublicUser::from(&user),
    })))
}
