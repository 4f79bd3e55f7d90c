mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::setup;
use serde_json::json;
use tower::util::ServiceExt;

#[tokio::test]
async fn health_endpoint_responds() -> anyhow::Result<()> {
    let harness = setup().await?;
    let app = harness.app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn public_registration_creates_member() -> anyhow::Result<()> {
    let harness = setup().await?;
    let app = harness.app();

    let payload = json!({
        "company_name": "Mahadeva Agro Traders",
        "contact_person": "Suresh Kumar",
        "mobile": "9876543210",
        "email": "api@example.com",
        "address": "12 Market Road",
        "city": "Mysuru",
        "taluk": "Mysuru",
        "district": "Mysuru",
        "state": "Karnataka",
        "pin_code": "570001",
        "category": "Wholesale",
        "license_url": "http://localhost:8080/storage/documents/license.pdf",
        "id_proof_url": "http://localhost:8080/storage/documents/id.pdf"
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/public/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let member = harness
        .services
        .member_service
        .find_by_email("api@example.com")
        .await?;
    assert!(member.is_some());

    Ok(())
}

#[tokio::test]
async fn admin_routes_require_a_session() -> anyhow::Result<()> {
    let harness = setup().await?;

    let response = harness
        .app()
        .oneshot(Request::builder().uri("/admin/stats").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = harness
        .app()
        .oneshot(
            Request::builder()
                .uri("/admin/members")
                .header(header::COOKIE, "session=bogus")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn login_cookie_grants_admin_access() -> anyhow::Result<()> {
    let harness = setup().await?;

    harness
        .services
        .auth_service
        .create_admin("admin@samiti.local", "admin123")
        .await?;

    let login = json!({ "email": "admin@samiti.local", "password": "admin123" });
    let response = harness
        .app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(login.to_string()))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
        .unwrap();

    let response = harness
        .app()
        .oneshot(
            Request::builder()
                .uri("/admin/stats")
                .header(header::COOKIE, cookie)
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn wrong_password_is_unauthorized() -> anyhow::Result<()> {
    let harness = setup().await?;

    harness
        .services
        .auth_service
        .create_admin("admin@samiti.local", "admin123")
        .await?;

    let login = json!({ "email": "admin@samiti.local", "password": "nope" });
    let response = harness
        .app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(login.to_string()))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}
