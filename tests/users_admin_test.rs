mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn ban_blocks_login_and_activate_restores_it() {
    let app = common::test_app().await;
    let admin = common::admin_token(&app, "admin@x.com").await;
    let login = common::register_verified(&app, "Ana", "ana@x.com", "secret1").await;
    let id = login["user"]["id"].as_i64().unwrap_or_default();

    let (status, body) =
        common::patch_auth(&app.router, &format!("/api/v1/users/{id}/ban"), &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(common::json(&body)["is_active"], false);

    let (status, _) = common::login(&app, "ana@x.com", "secret1").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) =
        common::patch_auth(&app.router, &format!("/api/v1/users/{id}/activate"), &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(common::json(&body)["is_active"], true);

    let (status, _) = common::login(&app, "ana@x.com", "secret1").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn ban_is_idempotent() {
    let app = common::test_app().await;
    let admin = common::admin_token(&app, "admin@x.com").await;
    let login = common::register_verified(&app, "Ana", "ana@x.com", "secret1").await;
    let id = login["user"]["id"].as_i64().unwrap_or_default();

    for _ in 0..2 {
        let (status, body) =
            common::patch_auth(&app.router, &format!("/api/v1/users/{id}/ban"), &admin).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(common::json(&body)["is_active"], false);
    }
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let app = common::test_app().await;
    let admin = common::admin_token(&app, "admin@x.com").await;

    let (status, body) = common::patch_auth(&app.router, "/api/v1/users/4242/ban", &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(common::json(&body)["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn members_cannot_ban() {
    let app = common::test_app().await;
    let ana = common::register_verified(&app, "Ana", "ana@x.com", "secret1").await;
    let bea = common::register_verified(&app, "Bea", "bea@x.com", "secret1").await;
    let token = ana["access_token"].as_str().unwrap_or_default();
    let target = bea["user"]["id"].as_i64().unwrap_or_default();

    let (status, _) =
        common::patch_auth(&app.router, &format!("/api/v1/users/{target}/ban"), token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
