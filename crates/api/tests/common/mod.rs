#![allow(dead_code)]

use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use knowmaint_api::auth::jwt::{generate_access_token, generate_refresh_token, JwtConfig};
use knowmaint_api::auth::password::hash_password;
use knowmaint_api::auth::revocation::MemoryRevocationList;
use knowmaint_api::config::ServerConfig;
use knowmaint_api::router::build_app_router;
use knowmaint_api::state::AppState;
use knowmaint_core::proposal::{Decision, ProposalStatus, ProposalType};
use knowmaint_core::roles::UserRole;
use knowmaint_core::types::DbId;
use knowmaint_db::models::article::{Article, CreateArticle};
use knowmaint_db::models::group::{CreateGroup, Group};
use knowmaint_db::models::proposal::{CreateProposal, Proposal};
use knowmaint_db::models::user::{CreateUser, User};
use knowmaint_db::repositories::{ArticleRepo, GroupRepo, ProposalRepo, UserRepo};

/// Password of every user created through [`create_user`].
pub const TEST_PASSWORD: &str = "test-password-123";

const PRIVATE_PEM: &[u8] = include_bytes!("../fixtures/test_private_key.pem");
const PUBLIC_PEM: &[u8] = include_bytes!("../fixtures/test_public_key.pem");

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Test `ServerConfig`: fixture RSA keys, no Redis, no bootstrap admin.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        redis_url: None,
        jwt: JwtConfig::from_pem(PRIVATE_PEM, PUBLIC_PEM, 30, 7).unwrap(),
        bootstrap_admin: None,
    }
}

/// The full application router with the production middleware stack and an
/// in-process revocation list.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        revocation: Arc::new(MemoryRevocationList::new()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<serde_json::Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, request(Method::GET, uri, None, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, request(Method::GET, uri, Some(token), None)).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, request(Method::POST, uri, None, Some(body))).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, request(Method::POST, uri, Some(token), Some(body))).await
}

/// POST without a body.
pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, request(Method::POST, uri, Some(token), None)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, request(Method::PUT, uri, Some(token), Some(body))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, request(Method::DELETE, uri, Some(token), None)).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

pub fn access_token(user_id: DbId) -> String {
    generate_access_token(user_id, &test_config().jwt).unwrap()
}

pub fn refresh_token(user_id: DbId) -> String {
    generate_refresh_token(user_id, &test_config().jwt).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Argon2 is slow in debug builds; hash the shared test password once.
fn test_password_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(TEST_PASSWORD).unwrap()).clone()
}

pub async fn create_user(
    pool: &PgPool,
    username: &str,
    role: UserRole,
    group_id: Option<DbId>,
) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: test_password_hash(),
            role,
            group_id,
        },
    )
    .await
    .unwrap()
}

pub async fn create_group(pool: &PgPool, name: &str) -> Group {
    GroupRepo::create(
        pool,
        &CreateGroup {
            name: name.to_string(),
            description: None,
        },
    )
    .await
    .unwrap()
}

pub async fn create_article(pool: &PgPool, code: &str, name: &str, group_id: DbId) -> Article {
    ArticleRepo::create(
        pool,
        &CreateArticle {
            code: code.to_string(),
            name: name.to_string(),
            approval_group_id: group_id,
        },
    )
    .await
    .unwrap()
}

/// Minimal valid create payload against `article_code`.
pub fn new_proposal(article_code: &str) -> CreateProposal {
    CreateProposal {
        article_id: article_code.to_string(),
        proposal_type: ProposalType::Modify,
        title: "Clarify reset steps".to_string(),
        info_category_id: None,
        keywords: None,
        importance: None,
        published_start: None,
        published_end: None,
        target: None,
        question: Some("How do I reset my password?".to_string()),
        answer: Some("Use the reset link on the login page.".to_string()),
        add_comments: None,
        reason: "Steps changed with the new portal".to_string(),
        before: None,
    }
}

/// Insert a proposal directly, bypassing HTTP.
pub async fn create_proposal(pool: &PgPool, user_id: DbId, article_code: &str) -> Proposal {
    ProposalRepo::create(pool, user_id, &new_proposal(article_code))
        .await
        .unwrap()
        .unwrap()
}

/// Move a proposal to a terminal status directly, bypassing HTTP.
pub async fn decide(pool: &PgPool, id: DbId, approver_id: DbId, status: ProposalStatus) {
    let rejection_reason = match status {
        ProposalStatus::Rejected => Some("Not accurate".to_string()),
        ProposalStatus::Approved | ProposalStatus::Pending => None,
    };
    let mut tx = pool.begin().await.unwrap();
    ProposalRepo::apply_decision(
        &mut tx,
        id,
        approver_id,
        &Decision {
            status,
            rejection_reason,
        },
    )
    .await
    .unwrap()
    .unwrap();
    tx.commit().await.unwrap();
}

/// A small world: two groups, one article per group, and users in each role.
pub struct World {
    pub group_a: Group,
    pub group_b: Group,
    pub article_a: Article,
    pub article_b: Article,
    pub admin: User,
    pub supervisor_a: User,
    pub supervisor_b: User,
    pub general_a: User,
    pub general_b: User,
}

pub async fn seed_world(pool: &PgPool) -> World {
    let group_a = create_group(pool, "Support").await;
    let group_b = create_group(pool, "Billing").await;
    let article_a = create_article(pool, "KB-A1", "Password reset", group_a.id).await;
    let article_b = create_article(pool, "KB-B1", "Invoice download", group_b.id).await;
    let admin = create_user(pool, "admin", UserRole::Admin, None).await;
    let supervisor_a = create_user(pool, "sv_a", UserRole::Supervisor, Some(group_a.id)).await;
    let supervisor_b = create_user(pool, "sv_b", UserRole::Supervisor, Some(group_b.id)).await;
    let general_a = create_user(pool, "gen_a", UserRole::General, Some(group_a.id)).await;
    let general_b = create_user(pool, "gen_b", UserRole::General, Some(group_b.id)).await;
    World {
        group_a,
        group_b,
        article_a,
        article_b,
        admin,
        supervisor_a,
        supervisor_b,
        general_a,
        general_b,
    }
}
