mod common;

use chrono::{Duration, Utc};
use common::{registration, setup, signed_callback};
use samiti::{
    domain::{MemberStatus, PaymentStatus, PaymentType},
    error::AppError,
    payments::PaymentCallback,
    repository::{MemberRepository, SqliteMemberRepository},
};

#[tokio::test]
async fn checkout_quotes_fee_with_surcharge() -> anyhow::Result<()> {
    let harness = setup().await?;
    let members = &harness.services.member_service;
    let payments = &harness.services.payment_service;

    let member = members.register(registration("quote@example.com")).await?;
    let session = payments
        .begin_checkout(member.id, PaymentType::Registration, 0.0)
        .await?;

    // 500 fee + 2% surcharge
    assert!((session.amount - 510.0).abs() < 0.01);
    assert_eq!(session.amount_paise, 51000);
    assert_eq!(session.currency, "INR");
    assert_eq!(harness.gateway.last_order_paise(), Some(51000));

    let row = payments.list_for_member(member.id).await?.remove(0);
    assert_eq!(row.status, PaymentStatus::Pending);
    assert_eq!(row.gateway_order_id.as_deref(), Some(session.order_id.as_str()));

    Ok(())
}

#[tokio::test]
async fn checkout_with_donation_includes_it_in_surcharge_base() -> anyhow::Result<()> {
    let harness = setup().await?;
    let members = &harness.services.member_service;
    let payments = &harness.services.payment_service;

    let member = members.register(registration("bundle@example.com")).await?;
    let session = payments
        .begin_checkout(member.id, PaymentType::Registration, 250.0)
        .await?;

    // 500 + 250 + 2% of 750
    assert!((session.amount - 765.0).abs() < 0.01);

    let row = payments.list_for_member(member.id).await?.remove(0);
    assert!((row.donation_amount - 250.0).abs() < 0.01);
    assert!((row.gateway_charges - 15.0).abs() < 0.01);

    Ok(())
}

#[tokio::test]
async fn negative_donation_amount_is_rejected_before_the_gateway() -> anyhow::Result<()> {
    let harness = setup().await?;
    let members = &harness.services.member_service;
    let payments = &harness.services.payment_service;

    let member = members.register(registration("neg@example.com")).await?;
    let err = payments
        .begin_checkout(member.id, PaymentType::Registration, -10.0)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(harness.gateway.order_count(), 0);

    Ok(())
}

#[tokio::test]
async fn confirmed_registration_leaves_member_pending() -> anyhow::Result<()> {
    let harness = setup().await?;
    let members = &harness.services.member_service;
    let payments = &harness.services.payment_service;

    let member = members.register(registration("stays@example.com")).await?;
    let session = payments
        .begin_checkout(member.id, PaymentType::Registration, 0.0)
        .await?;

    let payment = payments
        .confirm(signed_callback(&session.order_id, "pay_100"))
        .await?;
    assert_eq!(payment.status, PaymentStatus::Completed);
    assert_eq!(payment.gateway_payment_id.as_deref(), Some("pay_100"));

    // Payment success is necessary but not sufficient for approval.
    let member = members.get(member.id).await?;
    assert_eq!(member.status, MemberStatus::Pending);

    Ok(())
}

#[tokio::test]
async fn bad_signature_changes_nothing() -> anyhow::Result<()> {
    let harness = setup().await?;
    let members = &harness.services.member_service;
    let payments = &harness.services.payment_service;

    let member = members.register(registration("forged@example.com")).await?;
    let session = payments
        .begin_checkout(member.id, PaymentType::Registration, 0.0)
        .await?;

    let forged = PaymentCallback {
        order_id: session.order_id.clone(),
        payment_id: "pay_evil".to_string(),
        signature: "0".repeat(64),
    };
    let err = payments.confirm(forged).await.unwrap_err();
    assert!(matches!(err, AppError::Verification(_)));

    let row = payments.list_for_member(member.id).await?.remove(0);
    assert_eq!(row.status, PaymentStatus::Pending);
    assert!(row.gateway_payment_id.is_none());

    Ok(())
}

#[tokio::test]
async fn renewal_extends_one_term_from_now() -> anyhow::Result<()> {
    let harness = setup().await?;
    let repo = SqliteMemberRepository::new(harness.pool.clone());
    let members = &harness.services.member_service;
    let payments = &harness.services.payment_service;

    // Approved member whose expiry lapsed 400 days ago
    let member = members.register(registration("renew@example.com")).await?;
    let past = Utc::now() - Duration::days(400);
    repo.approve(member.id, "KMDA 0042", past, Utc::now()).await?;

    let session = payments
        .begin_checkout(member.id, PaymentType::Renewal, 0.0)
        .await?;
    payments
        .confirm(signed_callback(&session.order_id, "pay_renew"))
        .await?;

    // One full term from the renewal moment, not stacked on the old expiry.
    let member = members.get(member.id).await?;
    let expected = Utc::now() + Duration::days(365);
    assert!((member.expiry_date.unwrap() - expected).num_seconds().abs() < 60);

    Ok(())
}

#[tokio::test]
async fn pending_member_cannot_renew() -> anyhow::Result<()> {
    let harness = setup().await?;
    let members = &harness.services.member_service;
    let payments = &harness.services.payment_service;

    let member = members.register(registration("early@example.com")).await?;
    let err = payments
        .begin_checkout(member.id, PaymentType::Renewal, 0.0)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    Ok(())
}

#[tokio::test]
async fn abandoned_checkout_never_blocks_a_new_attempt() -> anyhow::Result<()> {
    let harness = setup().await?;
    let members = &harness.services.member_service;
    let payments = &harness.services.payment_service;

    let member = members.register(registration("retry@example.com")).await?;
    let first = payments
        .begin_checkout(member.id, PaymentType::Registration, 0.0)
        .await?;
    let second = payments
        .begin_checkout(member.id, PaymentType::Registration, 0.0)
        .await?;
    assert_ne!(first.order_id, second.order_id);

    payments
        .confirm(signed_callback(&second.order_id, "pay_second"))
        .await?;

    let rows = payments.list_for_member(member.id).await?;
    assert_eq!(rows.len(), 2);
    let completed = rows
        .iter()
        .filter(|p| p.status == PaymentStatus::Completed)
        .count();
    let pending = rows
        .iter()
        .filter(|p| p.status == PaymentStatus::Pending)
        .count();
    assert_eq!((completed, pending), (1, 1));

    Ok(())
}

#[tokio::test]
async fn redelivered_callback_is_idempotent() -> anyhow::Result<()> {
    let harness = setup().await?;
    let members = &harness.services.member_service;
    let payments = &harness.services.payment_service;

    let member = members.register(registration("replay@example.com")).await?;
    let session = payments
        .begin_checkout(member.id, PaymentType::Registration, 0.0)
        .await?;

    let callback = signed_callback(&session.order_id, "pay_once");
    let first = payments.confirm(callback.clone()).await?;
    let second = payments.confirm(callback).await?;
    assert_eq!(first.id, second.id);
    assert_eq!(second.status, PaymentStatus::Completed);

    // Same order, different gateway payment id: refused.
    let err = payments
        .confirm(signed_callback(&session.order_id, "pay_other"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    Ok(())
}

#[tokio::test]
async fn gateway_failure_report_marks_payment_failed() -> anyhow::Result<()> {
    let harness = setup().await?;
    let members = &harness.services.member_service;
    let payments = &harness.services.payment_service;

    let member = members.register(registration("failed@example.com")).await?;
    let session = payments
        .begin_checkout(member.id, PaymentType::Registration, 0.0)
        .await?;

    let failed = payments
        .fail(&session.order_id, "card declined")
        .await?
        .unwrap();
    assert_eq!(failed.status, PaymentStatus::Failed);

    // A report for an order we never saw is tolerated.
    let missing = payments.fail("order_unknown", "card declined").await?;
    assert!(missing.is_none());

    // The failed row is terminal; a late success callback is refused.
    let err = payments
        .confirm(signed_callback(&session.order_id, "pay_late"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    Ok(())
}
