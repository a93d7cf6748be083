//! HTTP-level integration tests for login, token refresh, logout and the
//! bearer-token extractor.

mod common;

use axum::http::StatusCode;
use common::{
    access_token, body_json, create_user, get, get_auth, post_json, post_json_auth, refresh_token,
    TEST_PASSWORD,
};
use knowmaint_api::auth::jwt::{generate_access_token, JwtConfig};
use knowmaint_core::roles::UserRole;
use knowmaint_db::repositories::UserRepo;
use serde_json::json;
use sqlx::PgPool;

const ME: &str = "/api/v1/users/me";

/// Log in through the API and return the token response body.
async fn login(app: axum::Router, username: &str, password: &str) -> serde_json::Value {
    let body = json!({ "username": username, "password": password });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn login_returns_token_pair_and_user(pool: PgPool) {
    let user = create_user(&pool, "alice", UserRole::General, None).await;
    let app = common::build_test_app(pool);

    let json = login(app, "alice", TEST_PASSWORD).await;

    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_ne!(json["access_token"], json["refresh_token"]);
    assert_eq!(json["token_type"], "bearer");
    assert_eq!(json["expires_in"], 30 * 60);
    assert_eq!(json["user"]["id"], user.id);
    assert_eq!(json["user"]["role"], "general");
    assert!(json["user"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn wrong_password_and_unknown_user_get_same_401(pool: PgPool) {
    create_user(&pool, "alice", UserRole::General, None).await;
    let app = common::build_test_app(pool);

    let wrong_password = post_json(
        app.clone(),
        "/api/v1/auth/login",
        json!({ "username": "alice", "password": "not-the-password" }),
    )
    .await;
    let unknown_user = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "username": "nobody", "password": TEST_PASSWORD }),
    )
    .await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    let a = body_json(wrong_password).await;
    let b = body_json(unknown_user).await;
    assert_eq!(a["error"], "Invalid username or password");
    assert_eq!(a, b);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn access_token_from_login_authenticates(pool: PgPool) {
    create_user(&pool, "alice", UserRole::Supervisor, None).await;
    let app = common::build_test_app(pool);

    let tokens = login(app.clone(), "alice", TEST_PASSWORD).await;
    let response = get_auth(app, ME, tokens["access_token"].as_str().unwrap()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "alice");
    assert_eq!(json["data"]["role"], "supervisor");
}

// ---------------------------------------------------------------------------
// Bearer extraction
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_token_returns_401(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, ME).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Missing Authorization header");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn garbage_token_returns_401(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app, ME, "not.a.jwt").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid or expired token");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn token_signed_with_other_key_returns_401(pool: PgPool) {
    let user = create_user(&pool, "alice", UserRole::Admin, None).await;
    let foreign = JwtConfig::from_pem(
        include_bytes!("fixtures/other_private_key.pem"),
        include_bytes!("fixtures/test_public_key.pem"),
        30,
        7,
    )
    .unwrap();
    let token = generate_access_token(user.id, &foreign).unwrap();
    let app = common::build_test_app(pool);

    let response = get_auth(app, ME, &token).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn refresh_token_is_not_accepted_as_access_token(pool: PgPool) {
    let user = create_user(&pool, "alice", UserRole::General, None).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, ME, &refresh_token(user.id)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn token_of_deleted_user_returns_401(pool: PgPool) {
    let user = create_user(&pool, "alice", UserRole::General, None).await;
    let token = access_token(user.id);
    UserRepo::delete(&pool, user.id).await.unwrap();
    let app = common::build_test_app(pool);

    let response = get_auth(app, ME, &token).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "User no longer exists");
}

// ---------------------------------------------------------------------------
// Refresh
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn refresh_issues_new_pair(pool: PgPool) {
    create_user(&pool, "alice", UserRole::General, None).await;
    let app = common::build_test_app(pool);
    let tokens = login(app.clone(), "alice", TEST_PASSWORD).await;

    let response = post_json(
        app.clone(),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": tokens["refresh_token"] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let refreshed = body_json(response).await;
    assert_ne!(refreshed["refresh_token"], tokens["refresh_token"]);
    let me = get_auth(app, ME, refreshed["access_token"].as_str().unwrap()).await;
    assert_eq!(me.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn refresh_token_works_only_once(pool: PgPool) {
    create_user(&pool, "alice", UserRole::General, None).await;
    let app = common::build_test_app(pool);
    let tokens = login(app.clone(), "alice", TEST_PASSWORD).await;
    let body = json!({ "refresh_token": tokens["refresh_token"] });

    let first = post_json(app.clone(), "/api/v1/auth/refresh", body.clone()).await;
    let second = post_json(app, "/api/v1/auth/refresh", body).await;

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(second).await;
    assert_eq!(json["error"], "Token has been revoked");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn access_token_is_not_accepted_for_refresh(pool: PgPool) {
    let user = create_user(&pool, "alice", UserRole::General, None).await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        json!({ "refresh_token": access_token(user.id) }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Logout
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn logout_revokes_access_token(pool: PgPool) {
    create_user(&pool, "alice", UserRole::General, None).await;
    let app = common::build_test_app(pool);
    let tokens = login(app.clone(), "alice", TEST_PASSWORD).await;
    let access = tokens["access_token"].as_str().unwrap();

    let response = common::post_auth(app.clone(), "/api/v1/auth/logout", access).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let me = get_auth(app, ME, access).await;
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(me).await;
    assert_eq!(json["error"], "Token has been revoked");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn logout_with_refresh_token_revokes_both(pool: PgPool) {
    create_user(&pool, "alice", UserRole::General, None).await;
    let app = common::build_test_app(pool);
    let tokens = login(app.clone(), "alice", TEST_PASSWORD).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/auth/logout",
        json!({ "refresh_token": tokens["refresh_token"] }),
        tokens["access_token"].as_str().unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let refresh = post_json(
        app,
        "/api/v1/auth/refresh",
        json!({ "refresh_token": tokens["refresh_token"] }),
    )
    .await;
    assert_eq!(refresh.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn logout_rejects_someone_elses_refresh_token(pool: PgPool) {
    let alice = create_user(&pool, "alice", UserRole::General, None).await;
    let bob = create_user(&pool, "bob", UserRole::General, None).await;
    let app = common::build_test_app(pool);
    let bobs_refresh = refresh_token(bob.id);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/auth/logout",
        json!({ "refresh_token": bobs_refresh }),
        &access_token(alice.id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Bob's session is untouched.
    let refresh = post_json(
        app,
        "/api/v1/auth/refresh",
        json!({ "refresh_token": bobs_refresh }),
    )
    .await;
    assert_eq!(refresh.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn logout_requires_authentication(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/auth/logout", json!({})).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
