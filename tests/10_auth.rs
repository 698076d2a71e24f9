mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use common::{admin_token, app, call, login};

#[tokio::test]
async fn health_endpoint_is_public() -> Result<()> {
    let (app, _) = app().await?;

    let res = call(&app, Method::GET, "/health", None, None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "ok");
    assert_eq!(res.body["backend"], "sqlite");
    Ok(())
}

#[tokio::test]
async fn login_sets_http_only_cookie_and_returns_token() -> Result<()> {
    let (app, _) = app().await?;

    let res = call(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "admin", "password": "admin" })),
    )
    .await?;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["user"]["username"], "admin");
    assert_eq!(res.body["user"]["role"], "admin");
    assert!(res.body["token"].as_str().is_some_and(|t| !t.is_empty()));

    let cookie = res.headers[header::SET_COOKIE].to_str()?;
    assert!(cookie.starts_with("auth_token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_rejected_without_detail() -> Result<()> {
    let (app, _) = app().await?;

    for (username, password) in [("admin", "nope"), ("nobody", "admin")] {
        let res = call(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": username, "password": password })),
        )
        .await?;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
        assert_eq!(res.body["message"], "Invalid username or password");
    }
    Ok(())
}

#[tokio::test]
async fn me_reports_the_bearer_principal() -> Result<()> {
    let (app, _) = app().await?;
    let token = admin_token(&app).await?;

    let res = call(&app, Method::GET, "/api/auth/me", Some(&token), None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["username"], "admin");
    assert_eq!(res.body["role"], "admin");
    Ok(())
}

#[tokio::test]
async fn session_cookie_authenticates_requests() -> Result<()> {
    let (app, _) = app().await?;
    let token = admin_token(&app).await?;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/auth/me")
        .header(header::COOKIE, format!("theme=dark; auth_token={}", token))
        .body(Body::empty())?;
    let response = app.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await?.to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["username"], "admin");
    Ok(())
}

#[tokio::test]
async fn api_without_session_is_401() -> Result<()> {
    let (app, _) = app().await?;

    let res = call(&app, Method::GET, "/api/orders", None, None).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = call(&app, Method::GET, "/api/orders", Some("not-a-jwt"), None).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn pages_without_session_redirect_to_login() -> Result<()> {
    let (app, _) = app().await?;

    let res = call(&app, Method::GET, "/?tab=queue", None, None).await?;
    assert_eq!(res.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(res.headers[header::LOCATION], "/login?from=%2F%3Ftab%3Dqueue");
    Ok(())
}

#[tokio::test]
async fn signed_in_user_visiting_login_goes_home() -> Result<()> {
    let (app, _) = app().await?;
    let token = admin_token(&app).await?;

    let res = call(&app, Method::GET, "/login", Some(&token), None).await?;
    assert_eq!(res.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(res.headers[header::LOCATION], "/");
    Ok(())
}

#[tokio::test]
async fn staff_cannot_reach_admin_api() -> Result<()> {
    let (app, _) = app().await?;
    let admin = admin_token(&app).await?;

    let res = call(
        &app,
        Method::POST,
        "/api/admin/users",
        Some(&admin),
        Some(json!({ "username": "cashier", "password": "counter-pass" })),
    )
    .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["role"], "user");

    let cashier = login(&app, "cashier", "counter-pass").await?;
    let res = call(&app, Method::GET, "/api/admin/users", Some(&cashier), None).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = call(&app, Method::GET, "/api/orders", Some(&cashier), None).await?;
    assert_eq!(res.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn logout_clears_the_cookie() -> Result<()> {
    let (app, _) = app().await?;

    let res = call(&app, Method::POST, "/api/auth/logout", None, None).await?;
    assert_eq!(res.status, StatusCode::OK);
    let cookie = res.headers[header::SET_COOKIE].to_str()?;
    assert!(cookie.starts_with("auth_token=;"));
    assert!(cookie.contains("Max-Age=0"));
    Ok(())
}
