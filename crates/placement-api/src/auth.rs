//! # Authentication Middleware
//!
//! Resolves the acting principal of every request and injects it into the
//! request extensions as an [`Actor`]. Handlers take it through the
//! [`Caller`] extractor and pass it explicitly into each workflow call.
//!
//! ## Token Format
//!
//! ```text
//! Bearer {role}:{user_id}:{secret}     role = student | teacher | admin
//! (no Authorization header)            guest
//! ```
//!
//! The secret is compared in constant time against `AUTH_TOKEN`. When no
//! `AUTH_TOKEN` is configured (development mode), the secret segment is
//! optional and not checked.

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use placement_core::{Actor, Role, UserId};
use subtle::ConstantTimeEq;

use crate::error::{AppError, ErrorBody, ErrorDetail};

// ── Caller ──────────────────────────────────────────────────────────

/// The acting principal of the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub Actor);

/// Extracts the actor that [`auth_middleware`] injected.
/// Returns 401 if the middleware did not run.
#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .copied()
            .map(Caller)
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

// ── Auth Configuration ──────────────────────────────────────────────

/// Auth configuration injected into request extensions.
///
/// Custom `Debug` redacts the token value.
#[derive(Clone, Default)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ── Token Validation ────────────────────────────────────────────────

/// Constant-time comparison of token secrets.
///
/// On a length mismatch a dummy comparison still runs.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Parse a bearer token into an [`Actor`].
///
/// With `expected_secret` set, the token must be `{role}:{user_id}:{secret}`
/// with a matching secret. Without it, `{role}:{user_id}` is enough and any
/// trailing segment is ignored. `user_id` may be a bare UUID or carry the
/// `user:` prefix that [`UserId`] displays with.
pub fn parse_bearer_token(provided: &str, expected_secret: Option<&str>) -> Result<Actor, String> {
    const FORMAT: &str = "invalid token format, expected {role}:{user_id}:{secret}";

    let (role_str, rest) = provided.split_once(':').ok_or(FORMAT)?;
    let rest = rest.strip_prefix("user:").unwrap_or(rest);
    let (user_str, secret) = match rest.split_once(':') {
        Some((user, secret)) => (user, Some(secret)),
        None => (rest, None),
    };

    match (secret, expected_secret) {
        (Some(secret), Some(expected)) => {
            if !constant_time_token_eq(secret, expected) {
                return Err("invalid bearer token".into());
            }
        }
        (None, Some(_)) => return Err(FORMAT.into()),
        (_, None) => {}
    }

    let role: Role = role_str.parse().map_err(|e| format!("{e}"))?;
    if role == Role::Guest {
        return Err("guest access takes no bearer token".into());
    }
    let user_id: UserId = user_str
        .parse()
        .map_err(|e| format!("invalid user_id: {e}"))?;

    Ok(Actor {
        role,
        user_id: Some(user_id),
    })
}

// ── Middleware ──────────────────────────────────────────────────────

/// Resolve the caller from the `Authorization` header.
///
/// A request without the header proceeds as a guest; the workflow gate
/// decides what a guest may do. A malformed or wrong token is rejected
/// with 401 before reaching any handler.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let config = request
        .extensions()
        .get::<AuthConfig>()
        .cloned()
        .unwrap_or_default();

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .map(|v| v.to_str().unwrap_or_default().to_owned());

    let actor = match auth_header {
        None => Actor::guest(),
        Some(value) => match value.strip_prefix("Bearer ") {
            Some(provided) => match parse_bearer_token(provided, config.token.as_deref()) {
                Ok(actor) => actor,
                Err(msg) => {
                    tracing::warn!(reason = %msg, "authentication failed: invalid bearer token");
                    return unauthorized_response(&msg);
                }
            },
            None => {
                tracing::warn!("authentication failed: non-Bearer authorization scheme");
                return unauthorized_response("authorization header must use Bearer scheme");
            }
        },
    };

    request.extensions_mut().insert(actor);
    next.run(request).await
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            details: None,
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    const USER: &str = "6f1c8a52-3c1e-4f7e-9d0a-5b1f2f0e8c11";

    /// Router echoing the resolved caller.
    fn test_app(token: Option<String>) -> Router {
        Router::new()
            .route(
                "/whoami",
                get(|Caller(actor): Caller| async move { actor.to_string() }),
            )
            .layer(from_fn(auth_middleware))
            .layer(axum::Extension(AuthConfig { token }))
    }

    async fn call(app: Router, auth: Option<&str>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(auth) = auth {
            builder = builder.header("Authorization", auth);
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn missing_header_is_guest() {
        let (status, body) = call(test_app(Some("s3cret".into())), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "guest");
    }

    #[tokio::test]
    async fn valid_token_resolves_actor() {
        let header = format!("Bearer teacher:{USER}:s3cret");
        let (status, body) = call(test_app(Some("s3cret".into())), Some(&header)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, format!("teacher(user:{USER})"));
    }

    #[tokio::test]
    async fn wrong_secret_rejected() {
        let header = format!("Bearer admin:{USER}:guess");
        let (status, body) = call(test_app(Some("s3cret".into())), Some(&header)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let err: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(err["error"]["code"], "UNAUTHORIZED");
        assert!(err["error"]["message"].as_str().unwrap().contains("invalid"));
    }

    #[tokio::test]
    async fn non_bearer_scheme_rejected() {
        let (status, body) = call(test_app(None), Some("Basic dXNlcjpwYXNz")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Bearer scheme"));
    }

    #[tokio::test]
    async fn dev_mode_skips_secret() {
        let header = format!("Bearer student:{USER}");
        let (status, body) = call(test_app(None), Some(&header)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, format!("student(user:{USER})"));
    }

    #[test]
    fn parse_requires_secret_when_configured() {
        let err = parse_bearer_token(&format!("teacher:{USER}"), Some("s3cret")).unwrap_err();
        assert!(err.contains("invalid token format"));
    }

    #[test]
    fn parse_rejects_unknown_role() {
        let err = parse_bearer_token(&format!("principal:{USER}:s3cret"), Some("s3cret")).unwrap_err();
        assert!(err.contains("principal"));
    }

    #[test]
    fn parse_rejects_guest_token() {
        assert!(parse_bearer_token(&format!("guest:{USER}"), None).is_err());
    }

    #[test]
    fn parse_rejects_bad_user_id() {
        let err = parse_bearer_token("admin:not-a-uuid:s3cret", Some("s3cret")).unwrap_err();
        assert!(err.contains("invalid user_id"));
    }

    #[test]
    fn secret_may_contain_colons() {
        let actor = parse_bearer_token(&format!("admin:{USER}:a:b:c"), Some("a:b:c")).unwrap();
        assert_eq!(actor.role, Role::Admin);
    }

    #[test]
    fn parse_accepts_displayed_user_id() {
        let user = UserId::new();
        let actor = parse_bearer_token(&format!("teacher:{user}:s3cret"), Some("s3cret")).unwrap();
        assert_eq!(actor.user_id, Some(user));

        let actor = parse_bearer_token(&format!("student:{user}"), None).unwrap();
        assert_eq!(actor, Actor::student(user));
    }

    #[test]
    fn parse_rejects_missing_user() {
        assert!(parse_bearer_token("admin", None).is_err());
        assert!(parse_bearer_token("admin:user:", None).is_err());
    }

    #[test]
    fn auth_config_debug_redacts_token() {
        let config = AuthConfig {
            token: Some("s3cret".into()),
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
