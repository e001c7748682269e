use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use service::auth::{flow, AuthService, AuthSession, NewUser, PublicUser};

use crate::errors::ApiError;
use crate::metrics::AuthMetrics;

const AUTH_COOKIE: &str = "auth_token";

#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<dyn AuthService>,
    pub metrics: Arc<AuthMetrics>,
}

impl ServerState {
    pub fn new(auth: Arc<dyn AuthService>) -> Result<Self, prometheus::Error> {
        Ok(Self { auth, metrics: Arc::new(AuthMetrics::new()?) })
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

impl From<CredentialsRequest> for NewUser {
    fn from(r: CredentialsRequest) -> Self {
        NewUser { username: r.username, password: r.password }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
}

impl From<PublicUser> for UserResponse {
    fn from(u: PublicUser) -> Self {
        Self { id: u.id, username: u.username }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub token: String,
    pub user: UserResponse,
}

impl From<AuthSession> for SessionResponse {
    fn from(s: AuthSession) -> Self {
        Self { token: s.token, user: s.user.into() }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WhoAmIResponse {
    pub id: i32,
}

/// User id resolved from a validated bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub i32);

#[utoipa::path(post, path = "/auth/signup", tag = "auth", request_body = CredentialsRequest, responses((status = 201, description = "Created", body = SessionResponse), (status = 400, description = "Username already taken", body = crate::openapi::ErrorResponse)))]
pub async fn signup(
    State(state): State<ServerState>,
    Json(input): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let res = flow::sign_up(state.auth.as_ref(), input.into()).await;
    state.metrics.record_signup(&res);
    Ok((StatusCode::CREATED, Json(res?.into())))
}

#[utoipa::path(post, path = "/auth/signin", tag = "auth", request_body = CredentialsRequest, responses((status = 200, description = "Signed in", body = SessionResponse), (status = 401, description = "Invalid credentials", body = crate::openapi::ErrorResponse)))]
pub async fn signin(
    State(state): State<ServerState>,
    Json(input): Json<CredentialsRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let res = flow::sign_in(state.auth.as_ref(), input.into()).await;
    state.metrics.record_signin(&res);
    Ok(Json(res?.into()))
}

#[utoipa::path(get, path = "/auth/whoami", tag = "auth", responses((status = 200, description = "Token owner", body = WhoAmIResponse), (status = 400, description = "Missing token"), (status = 401, description = "Invalid token")))]
pub async fn whoami(Extension(user): Extension<AuthenticatedUser>) -> Json<WhoAmIResponse> {
    Json(WhoAmIResponse { id: user.0 })
}

/// Pull the token from `Authorization: Bearer <t>`, falling back to the `auth_token` cookie.
fn extract_token(req: &Request) -> Result<String, ApiError> {
    let path = req.uri().path();
    if let Some(h) = req.headers().get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        return match h.strip_prefix("Bearer ") {
            Some(t) if !t.trim().is_empty() => Ok(t.trim().to_string()),
            _ => {
                tracing::warn!(path = %path, "invalid Authorization format (expect Bearer)");
                Err(ApiError::Auth(service::auth::AuthError::TokenInvalid("bad authorization header".into())))
            }
        };
    }

    let cookie_header = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let from_cookie = cookie_header
        .split(';')
        .filter_map(|kv| kv.trim().strip_prefix(AUTH_COOKIE)?.strip_prefix('='))
        .find(|t| !t.is_empty());

    match from_cookie {
        Some(t) => Ok(t.to_string()),
        None => {
            tracing::warn!(path = %path, "missing Authorization header and auth_token cookie");
            Err(ApiError::MissingToken)
        }
    }
}

/// Reject requests without a valid token; missing is 400, invalid or expired is 401.
pub async fn require_bearer_token(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(&req)?;
    let id = state.auth.validate_jwt(&token).map_err(|e| {
        tracing::warn!(path = %req.uri().path(), err = %e, "token validation failed");
        e
    })?;
    // Store ids start at 1; 0 is what the in-memory service returns for junk.
    if id <= 0 {
        tracing::warn!(path = %req.uri().path(), "token resolved to no user");
        return Err(ApiError::Auth(service::auth::AuthError::TokenInvalid("token does not name a user".into())));
    }
    req.extensions_mut().insert(AuthenticatedUser(id));
    Ok(next.run(req).await)
}
