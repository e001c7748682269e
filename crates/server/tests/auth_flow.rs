use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use server::routes::{self, auth::ServerState};
use service::auth::repository::mock::MockUserRepository;
use service::auth::{AuthConfig, AuthService, InMemoryAuthService, NewUser, StoreAuthService};

fn cors() -> tower_http::cors::CorsLayer { tower_http::cors::CorsLayer::very_permissive() }

fn build_app(svc: Arc<dyn AuthService>) -> Router {
    routes::build_router(ServerState::new(svc).expect("metrics registry"), cors())
}

async fn call(app: &Router, req: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    Ok((status, body))
}

async fn post_json(app: &Router, uri: &str, body: Value) -> anyhow::Result<(StatusCode, Value)> {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body)?))?;
    call(app, req).await
}

async fn whoami(app: &Router, header: Option<(header::HeaderName, String)>) -> anyhow::Result<(StatusCode, Value)> {
    let mut req = Request::builder().method("GET").uri("/auth/whoami");
    if let Some((name, value)) = header {
        req = req.header(name, value);
    }
    call(app, req.body(Body::empty())?).await
}

mod in_memory {
    use super::*;

    #[tokio::test]
    async fn signup_creates_user_and_returns_token() -> anyhow::Result<()> {
        let app = build_app(Arc::new(InMemoryAuthService::new()));

        let (status, body) = post_json(&app, "/auth/signup", json!({"username": "newuser", "password": "newpassword"})).await?;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["token"], "mock-jwt-1");
        assert_eq!(body["user"], json!({"id": 1, "username": "newuser"}));
        Ok(())
    }

    #[tokio::test]
    async fn signup_existing_username_is_rejected() -> anyhow::Result<()> {
        let svc = Arc::new(InMemoryAuthService::new());
        svc.create_user(NewUser::new("newuser", "newpassword")).await?;
        let app = build_app(svc.clone());

        let (status, body) = post_json(&app, "/auth/signup", json!({"username": "newuser", "password": "newpassword"})).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Username already taken"}));
        assert_eq!(svc.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn signin_existing_user_returns_token() -> anyhow::Result<()> {
        let svc = Arc::new(InMemoryAuthService::new());
        svc.create_user(NewUser::new("testuser", "password123")).await?;
        let app = build_app(svc);

        let (status, body) = post_json(&app, "/auth/signin", json!({"username": "testuser", "password": "password123"})).await?;
        assert_eq!(status, StatusCode::OK);
        assert!(body["token"].is_string());
        assert_eq!(body["user"], json!({"id": 1, "username": "testuser"}));
        Ok(())
    }

    #[tokio::test]
    async fn signin_wrong_password_and_unknown_user_share_response() -> anyhow::Result<()> {
        let svc = Arc::new(InMemoryAuthService::new());
        svc.create_user(NewUser::new("testuser", "password123")).await?;
        let app = build_app(svc);

        let wrong = post_json(&app, "/auth/signin", json!({"username": "testuser", "password": "wrongpassword"})).await?;
        let absent = post_json(&app, "/auth/signin", json!({"username": "nobody", "password": "password123"})).await?;
        assert_eq!(wrong.0, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong.1, json!({"error": "Invalid credentials"}));
        assert_eq!(wrong, absent);
        Ok(())
    }

    #[tokio::test]
    async fn cleared_store_restarts_ids() -> anyhow::Result<()> {
        let svc = Arc::new(InMemoryAuthService::new());
        let app = build_app(svc.clone());

        post_json(&app, "/auth/signup", json!({"username": "first", "password": "pw"})).await?;
        svc.clear_users();
        let (status, body) = post_json(&app, "/auth/signup", json!({"username": "second", "password": "pw"})).await?;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"]["id"], 1);
        Ok(())
    }

    #[tokio::test]
    async fn empty_username_is_bad_request() -> anyhow::Result<()> {
        let app = build_app(Arc::new(InMemoryAuthService::new()));
        let (status, body) = post_json(&app, "/auth/signup", json!({"username": "", "password": "pw"})).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "username required");
        Ok(())
    }

    #[tokio::test]
    async fn whoami_accepts_issued_token_and_rejects_junk() -> anyhow::Result<()> {
        let app = build_app(Arc::new(InMemoryAuthService::new()));
        let (_, session) = post_json(&app, "/auth/signup", json!({"username": "newuser", "password": "pw"})).await?;
        let token = session["token"].as_str().unwrap_or_default().to_string();

        let (status, me) = whoami(&app, Some((header::AUTHORIZATION, format!("Bearer {token}")))).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["id"], 1);

        for junk in ["garbage", "mock-jwt-abc", "mock-jwt-0"] {
            let (status, body) = whoami(&app, Some((header::AUTHORIZATION, format!("Bearer {junk}")))).await?;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "token {junk}");
            assert_eq!(body["error"], "Invalid token");
        }
        Ok(())
    }
}

mod store_backed {
    use super::*;

    fn app_with_repo(secret: Option<&str>) -> (Arc<MockUserRepository>, Router) {
        let repo = Arc::new(MockUserRepository::default());
        let cfg = AuthConfig { jwt_secret: secret.map(str::to_string) };
        let svc: Arc<dyn AuthService> = Arc::new(StoreAuthService::new(repo.clone(), cfg));
        (repo, build_app(svc))
    }

    #[tokio::test]
    async fn duplicate_signup_never_reaches_insert() -> anyhow::Result<()> {
        let (repo, app) = app_with_repo(Some("test-secret"));

        let (status, _) = post_json(&app, "/auth/signup", json!({"username": "newuser", "password": "a"})).await?;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = post_json(&app, "/auth/signup", json!({"username": "newuser", "password": "b"})).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Username already taken");
        assert_eq!(repo.insert_calls(), 1);
        assert_eq!(repo.find_calls(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn signed_token_opens_protected_route() -> anyhow::Result<()> {
        let (_repo, app) = app_with_repo(Some("test-secret"));

        let (_, body) = post_json(&app, "/auth/signup", json!({"username": "alice", "password": "password123"})).await?;
        let token = body["token"].as_str().expect("token").to_string();
        let id = body["user"]["id"].clone();

        let (status, me) = whoami(&app, Some((header::AUTHORIZATION, format!("Bearer {token}")))).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["id"], id);

        let (status, me) = whoami(&app, Some((header::COOKIE, format!("theme=dark; auth_token={token}")))).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["id"], id);
        Ok(())
    }

    #[tokio::test]
    async fn protected_route_rejects_missing_and_bad_tokens() -> anyhow::Result<()> {
        let (_repo, app) = app_with_repo(Some("test-secret"));

        let (status, body) = whoami(&app, None).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing bearer token");

        let (status, _) = whoami(&app, Some((header::AUTHORIZATION, "Bearer invalid.token.here".into()))).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = whoami(&app, Some((header::AUTHORIZATION, "Basic dXNlcjpwdw==".into()))).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn missing_secret_is_server_error() -> anyhow::Result<()> {
        let (_repo, app) = app_with_repo(None);
        let (status, body) = post_json(&app, "/auth/signup", json!({"username": "alice", "password": "pw"})).await?;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Internal server error"}));
        Ok(())
    }

    #[tokio::test]
    async fn store_outage_is_server_error() -> anyhow::Result<()> {
        let svc: Arc<dyn AuthService> =
            Arc::new(StoreAuthService::new(Arc::new(MockUserRepository::failing()), AuthConfig::with_secret("s")));
        let app = build_app(svc);
        let (status, _) = post_json(&app, "/auth/signin", json!({"username": "alice", "password": "pw"})).await?;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        Ok(())
    }
}

#[tokio::test]
async fn health_metrics_and_openapi() -> anyhow::Result<()> {
    let app = build_app(Arc::new(InMemoryAuthService::new()));

    let (status, body) = call(&app, Request::builder().uri("/health").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    post_json(&app, "/auth/signup", json!({"username": "m", "password": "pw"})).await?;
    let resp = app.clone().oneshot(Request::builder().uri("/metrics").body(Body::empty())?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let text = String::from_utf8(axum::body::to_bytes(resp.into_body(), usize::MAX).await?.to_vec())?;
    assert!(text.contains(r#"auth_signups_total{outcome="success"} 1"#), "{text}");

    let (status, doc) = call(&app, Request::builder().uri("/api-docs/openapi.json").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"].get("/auth/signup").is_some());
    assert!(doc["paths"].get("/auth/signin").is_some());
    Ok(())
}
