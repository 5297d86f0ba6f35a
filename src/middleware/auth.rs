use crate::{
    error::{AppError, Result},
    AppState,
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

/// Authenticated user attached to the request by [`require_auth`].
///
/// Handlers receive it via `Extension<CurrentUser>`, so the identity a
/// handler acts on is always an explicit parameter.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
}

/// Extract the session token from the Authorization header.
///
/// Both `Bearer <token>` and a bare token value are accepted. A missing or
/// empty header is reported separately from a malformed one.
fn extract_bearer_token(headers: &HeaderMap) -> Result<String> {
    let raw = headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::MissingToken)?
        .to_str()
        .map_err(|_| AppError::InvalidToken)?;

    if raw.is_empty() {
        return Err(AppError::MissingToken);
    }

    let token = raw.strip_prefix("Bearer ").unwrap_or(raw);
    Ok(token.to_string())
}

/// Session authentication middleware for the notes routes.
///
/// Verifies the bearer token, resolves the user it names and attaches a
/// [`CurrentUser`] to the request extensions. Any verification failure
/// (malformed, tampered, expired) produces the same 401 response.
pub async fn require_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let token = extract_bearer_token(&headers)?;

    let claims = state.token_service.verify(&token)?;

    let user = state
        .user_repository
        .find_by_id(claims.user_id)
        .await?
        .ok_or(AppError::UserNotFound)?;

    request.extensions_mut().insert(CurrentUser {
        id: user.id,
        email: user.email,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_token_with_bearer_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );

        let result = extract_bearer_token(&headers);
        assert_eq!(result.unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_extract_token_without_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("abc.def.ghi"),
        );

        let result = extract_bearer_token(&headers);
        assert_eq!(result.unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_extract_token_missing_header() {
        let headers = HeaderMap::new();

        let result = extract_bearer_token(&headers);
        assert!(matches!(result, Err(AppError::MissingToken)));
    }

    #[test]
    fn test_extract_token_empty_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(""));

        let result = extract_bearer_token(&headers);
        assert!(matches!(result, Err(AppError::MissingToken)));
    }

    #[test]
    fn test_extract_token_prefix_only_strips_first_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer Bearer abc"),
        );

        let result = extract_bearer_token(&headers);
        assert_eq!(result.unwrap(), "Bearer abc");
    }

    #[test]
    fn test_extract_token_non_utf8_header_is_invalid() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xff\xfe").unwrap(),
        );

        let result = extract_bearer_token(&headers);
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }
}
