use axum::Json;
use axum::http::HeaderMap;
use hyper::StatusCode;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use serde_json::{Value, json};

pub type AuthError = (StatusCode, Json<Value>);

/// Claims we need from a caller session token. `sub` is the user id the
/// scope resolver filters by.
#[derive(Debug, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    #[allow(dead_code)]
    pub exp: usize,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn unauthorized() -> AuthError {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "not authenticated" })),
    )
}

/// Verify the caller's HS256 session token and return its claims.
pub fn verify_session(
    headers: &HeaderMap,
    jwt_secret: Option<&str>,
) -> Result<SessionClaims, AuthError> {
    let Some(secret) = jwt_secret else {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "session verification not configured" })),
        ));
    };
    let Some(token) = bearer_token(headers) else {
        return Err(unauthorized());
    };
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(error = %e, "session token rejected");
        unauthorized()
    })
}

/// Gate for admin endpoints: the configured admin token, via
/// `x-admin-token` or a bearer header.
pub fn verify_admin(headers: &HeaderMap, admin_token: Option<&str>) -> Result<(), AuthError> {
    let Some(expected) = admin_token else {
        return Err((
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "admin access not configured" })),
        ));
    };
    let provided = headers
        .get("x-admin-token")
        .and_then(|v| v.to_str().ok())
        .or_else(|| bearer_token(headers));
    match provided {
        Some(token) if token == expected => Ok(()),
        Some(_) => Err((
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "admin access denied" })),
        )),
        None => Err(unauthorized()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestClaims {
        sub: String,
        exp: usize,
    }

    fn token(secret: &str, sub: &str) -> String {
        encode(
            &Header::default(),
            &TestClaims {
                sub: sub.into(),
                // far future
                exp: 4_891_363_200,
            },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn headers_with_bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", format!("Bearer {token}").parse().unwrap());
        headers
    }

    #[test]
    fn valid_session_token_yields_claims() {
        let headers = headers_with_bearer(&token("s3cret", "u1"));
        let claims = verify_session(&headers, Some("s3cret")).unwrap();
        assert_eq!(claims.sub, "u1");
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let headers = headers_with_bearer(&token("other", "u1"));
        let (status, _) = verify_session(&headers, Some("s3cret")).unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let (status, _) = verify_session(&HeaderMap::new(), Some("s3cret")).unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn unconfigured_secret_is_server_error() {
        let headers = headers_with_bearer(&token("s3cret", "u1"));
        let (status, _) = verify_session(&headers, None).unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn admin_token_accepted_from_either_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-admin-token", "admin-1".parse().unwrap());
        assert!(verify_admin(&headers, Some("admin-1")).is_ok());

        let headers = headers_with_bearer("admin-1");
        assert!(verify_admin(&headers, Some("admin-1")).is_ok());
    }

    #[test]
    fn wrong_admin_token_is_forbidden() {
        let mut headers = HeaderMap::new();
        headers.insert("x-admin-token", "wrong".parse().unwrap());
        let (status, _) = verify_admin(&headers, Some("admin-1")).unwrap_err();
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn missing_admin_token_is_unauthorized() {
        let (status, _) = verify_admin(&HeaderMap::new(), Some("admin-1")).unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
