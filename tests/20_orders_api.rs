mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use axum::Router;
use serde_json::json;

use common::{admin_token, app, call};

async fn stock_menu(app: &Router, token: &str) -> Result<()> {
    for (kind, name, price) in [
        ("feteer", "Plain", 40.0),
        ("feteer", "Cheese", 55.0),
        ("meat", "Sausage", 20.0),
        ("sweet", "Konafa", 30.0),
        ("sweet", "Basbousa", 25.0),
    ] {
        let res = call(
            app,
            Method::POST,
            "/api/admin/menu",
            Some(token),
            Some(json!({ "kind": kind, "name": name, "price": price })),
        )
        .await?;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    }
    Ok(())
}

#[tokio::test]
async fn feteer_order_is_priced_from_the_menu() -> Result<()> {
    let (app, _) = app().await?;
    let token = admin_token(&app).await?;
    stock_menu(&app, &token).await?;

    let res = call(
        &app,
        Method::POST,
        "/api/orders",
        Some(&token),
        Some(json!({
            "customer_name": "  Jane  ",
            "item_type": "feteer",
            "feteer_type": "Cheese",
            "meat_selection": "Sausage",
            "notes": "extra crispy"
        })),
    )
    .await?;

    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    assert_eq!(res.body["customer_name"], "Jane");
    assert_eq!(res.body["status"], "ordered");
    assert_eq!(res.body["price"], 75.0);
    assert_eq!(res.body["notes"], "extra crispy");
    assert!(res.body["sweet_selections"].is_null());
    Ok(())
}

#[tokio::test]
async fn sweet_order_sums_selections() -> Result<()> {
    let (app, _) = app().await?;
    let token = admin_token(&app).await?;
    stock_menu(&app, &token).await?;

    let res = call(
        &app,
        Method::POST,
        "/api/orders",
        Some(&token),
        Some(json!({
            "customer_name": "Omar",
            "item_type": "sweet",
            "sweet_selections": r#"{"Konafa":2,"Basbousa":1,"Ghoraiba":0}"#
        })),
    )
    .await?;

    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    assert_eq!(res.body["price"], 85.0);
    let stored: serde_json::Value = serde_json::from_str(res.body["sweet_selections"].as_str().unwrap_or("{}"))?;
    assert_eq!(stored, json!({ "Basbousa": 1, "Konafa": 2 }));
    Ok(())
}

#[tokio::test]
async fn invalid_drafts_report_the_field() -> Result<()> {
    let (app, _) = app().await?;
    let token = admin_token(&app).await?;

    let cases = [
        (json!({ "customer_name": "   ", "item_type": "feteer", "feteer_type": "Plain", "price": 10 }), "customer_name"),
        (json!({ "customer_name": "Jane", "price": 10 }), "item_type"),
        (json!({ "customer_name": "Jane", "item_type": "feteer", "price": 10 }), "feteer_type"),
        (json!({ "customer_name": "Jane", "item_type": "feteer", "feteer_type": "Plain", "price": -1 }), "price"),
    ];

    for (draft, field) in cases {
        let res = call(&app, Method::POST, "/api/orders", Some(&token), Some(draft)).await?;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{}", res.body);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(res.body["field_errors"][field].is_string(), "expected error on {}: {}", field, res.body);
    }

    let res = call(&app, Method::GET, "/api/orders", Some(&token), None).await?;
    assert_eq!(res.body, json!([]));
    Ok(())
}

#[tokio::test]
async fn order_lifecycle_through_the_queue() -> Result<()> {
    let (app, _) = app().await?;
    let token = admin_token(&app).await?;

    let mut ids = Vec::new();
    for name in ["First", "Second"] {
        let res = call(
            &app,
            Method::POST,
            "/api/orders",
            Some(&token),
            Some(json!({ "customer_name": name, "item_type": "feteer", "feteer_type": "Plain", "price": 40 })),
        )
        .await?;
        assert_eq!(res.status, StatusCode::CREATED);
        ids.push(res.body["id"].as_i64().unwrap_or_default());
    }

    // Newest first
    let res = call(&app, Method::GET, "/api/orders", Some(&token), None).await?;
    assert_eq!(res.body[0]["customer_name"], "Second");
    assert_eq!(res.body[1]["customer_name"], "First");

    let first = ids[0];
    let res = call(
        &app,
        Method::PATCH,
        &format!("/api/orders/{}", first),
        Some(&token),
        Some(json!({ "status": "completed" })),
    )
    .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "completed");

    let res = call(&app, Method::GET, "/api/orders?status=ordered", Some(&token), None).await?;
    assert_eq!(res.body.as_array().map(Vec::len), Some(1));
    assert_eq!(res.body[0]["customer_name"], "Second");

    let res = call(
        &app,
        Method::PATCH,
        &format!("/api/orders/{}", first),
        Some(&token),
        Some(json!({ "status": "teleported" })),
    )
    .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["field_errors"]["status"].is_string());

    let res = call(&app, Method::DELETE, &format!("/api/orders/{}", first), Some(&token), None).await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let res = call(&app, Method::GET, &format!("/api/orders/{}", first), Some(&token), None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = call(&app, Method::DELETE, &format!("/api/orders/{}", first), Some(&token), None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn menu_admin_and_listing() -> Result<()> {
    let (app, _) = app().await?;
    let token = admin_token(&app).await?;
    stock_menu(&app, &token).await?;

    let res = call(&app, Method::GET, "/api/menu?kind=sweet", Some(&token), None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body.as_array().map(Vec::len), Some(2));

    let konafa = res.body.as_array().and_then(|items| items.iter().find(|i| i["name"] == "Konafa")).cloned();
    let konafa_id = konafa.and_then(|k| k["id"].as_i64()).unwrap_or_default();

    let res = call(
        &app,
        Method::PATCH,
        &format!("/api/admin/menu/{}", konafa_id),
        Some(&token),
        Some(json!({ "price": 35.5, "available": false })),
    )
    .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["price"], 35.5);
    assert_eq!(res.body["available"], false);

    // Unavailable sweets cannot be priced from the menu
    let res = call(
        &app,
        Method::POST,
        "/api/orders",
        Some(&token),
        Some(json!({ "customer_name": "Omar", "item_type": "sweet", "sweet_type": "Konafa" })),
    )
    .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = call(&app, Method::POST, "/api/admin/menu", Some(&token), Some(json!({ "kind": "meat", "name": " ", "price": 5 }))).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = call(&app, Method::DELETE, &format!("/api/admin/menu/{}", konafa_id), Some(&token), None).await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn admins_cannot_lock_themselves_out() -> Result<()> {
    let (app, _) = app().await?;
    let token = admin_token(&app).await?;

    let me = call(&app, Method::GET, "/api/auth/me", Some(&token), None).await?;
    let my_id = me.body["id"].as_i64().unwrap_or_default();

    let res = call(
        &app,
        Method::PATCH,
        &format!("/api/admin/users/{}", my_id),
        Some(&token),
        Some(json!({ "role": "user" })),
    )
    .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = call(&app, Method::DELETE, &format!("/api/admin/users/{}", my_id), Some(&token), None).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = call(&app, Method::GET, "/api/admin/users", Some(&token), None).await?;
    assert_eq!(res.body.as_array().map(Vec::len), Some(1));
    assert!(res.body[0].get("password_hash").is_none());
    Ok(())
}

#[tokio::test]
async fn analytics_summarize_recent_orders() -> Result<()> {
    let (app, _) = app().await?;
    let token = admin_token(&app).await?;

    for (name, draft) in [
        ("A", json!({ "item_type": "feteer", "feteer_type": "Plain", "price": 40 })),
        ("B", json!({ "item_type": "feteer", "feteer_type": "Plain", "price": 60 })),
        ("C", json!({ "item_type": "sweet", "sweet_selections": r#"{"Konafa":3}"#, "price": 90 })),
    ] {
        let mut draft = draft;
        draft["customer_name"] = json!(name);
        let res = call(&app, Method::POST, "/api/orders", Some(&token), Some(draft)).await?;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    }

    let res = call(&app, Method::GET, "/api/admin/analytics?days=7", Some(&token), None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["days"], 7);
    assert_eq!(res.body["order_count"], 3);
    assert_eq!(res.body["revenue"], 190.0);
    assert_eq!(res.body["by_item_type"]["feteer"]["count"], 2);
    assert_eq!(res.body["top_feteer_types"][0]["name"], "Plain");
    assert_eq!(res.body["top_sweets"][0], json!({ "name": "Konafa", "quantity": 3 }));
    assert_eq!(res.body["daily"].as_array().map(Vec::len), Some(7));
    Ok(())
}
