mod common;

use common::setup;
use samiti::{auth::AuthService, error::AppError};
use uuid::Uuid;

#[tokio::test]
async fn password_hashing_round_trip() -> anyhow::Result<()> {
    let password = "my_secure_password";
    let hash = AuthService::hash_password(password).await?;

    assert!(AuthService::verify_password(password, &hash).await?);
    assert!(!AuthService::verify_password("wrong_password", &hash).await?);

    Ok(())
}

#[tokio::test]
async fn sign_in_and_session_lifecycle() -> anyhow::Result<()> {
    let harness = setup().await?;
    let auth = &harness.services.auth_service;

    let admin_id = auth.create_admin("admin@samiti.local", "admin123").await?;

    let token = auth.sign_in("admin@samiti.local", "admin123", 24).await?;
    let session = auth.validate_session(&token).await?.unwrap();
    assert_eq!(session.admin_id, admin_id);
    assert!(auth.is_admin(admin_id).await);

    auth.sign_out(&token).await?;
    assert!(auth.validate_session(&token).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn wrong_credentials_are_refused() -> anyhow::Result<()> {
    let harness = setup().await?;
    let auth = &harness.services.auth_service;

    auth.create_admin("admin@samiti.local", "admin123").await?;

    let err = auth
        .sign_in("admin@samiti.local", "wrong", 24)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));

    let err = auth
        .sign_in("nobody@samiti.local", "admin123", 24)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));

    Ok(())
}

#[tokio::test]
async fn unknown_user_is_not_admin() -> anyhow::Result<()> {
    let harness = setup().await?;
    let auth = &harness.services.auth_service;

    assert!(!auth.is_admin(Uuid::new_v4()).await);

    Ok(())
}
