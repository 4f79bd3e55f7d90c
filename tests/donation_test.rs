mod common;

use common::{setup, signed_callback};
use samiti::{
    domain::{CreateDonationRequest, DonationStatus},
    error::AppError,
};

fn donation_request(amount: f64) -> CreateDonationRequest {
    CreateDonationRequest {
        donor_name: Some("Well Wisher".to_string()),
        phone: Some("9876543210".to_string()),
        email: Some("donor@example.com".to_string()),
        amount,
        remarks: None,
    }
}

#[tokio::test]
async fn donation_checkout_and_confirmation() -> anyhow::Result<()> {
    let harness = setup().await?;
    let donations = &harness.services.donation_service;

    let checkout = donations.create(donation_request(250.0)).await?;
    assert_eq!(checkout.amount_paise, 25000);
    assert_eq!(harness.gateway.last_order_paise(), Some(25000));

    let donation = donations.get(checkout.donation_id).await?;
    assert_eq!(donation.status, DonationStatus::Pending);
    assert_eq!(
        donation.gateway_order_id.as_deref(),
        Some(checkout.order_id.as_str())
    );

    let donation = donations
        .confirm(signed_callback(&checkout.order_id, "pay_don_1"))
        .await?;
    assert_eq!(donation.status, DonationStatus::Completed);
    assert_eq!(donation.gateway_payment_id.as_deref(), Some("pay_don_1"));

    Ok(())
}

#[tokio::test]
async fn invalid_amount_never_reaches_the_gateway() -> anyhow::Result<()> {
    let harness = setup().await?;
    let donations = &harness.services.donation_service;

    for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
        let err = donations.create(donation_request(amount)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
    assert_eq!(harness.gateway.order_count(), 0);

    Ok(())
}

#[tokio::test]
async fn redelivered_confirmation_is_idempotent() -> anyhow::Result<()> {
    let harness = setup().await?;
    let donations = &harness.services.donation_service;

    let checkout = donations.create(donation_request(100.0)).await?;
    let callback = signed_callback(&checkout.order_id, "pay_don_2");

    let first = donations.confirm(callback.clone()).await?;
    let second = donations.confirm(callback).await?;
    assert_eq!(first.id, second.id);
    assert_eq!(second.status, DonationStatus::Completed);

    // Same order with a different gateway payment id is refused outright.
    let err = donations
        .confirm(signed_callback(&checkout.order_id, "pay_don_other"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ConflictingCompletion(_)));

    Ok(())
}

#[tokio::test]
async fn forged_signature_leaves_donation_pending() -> anyhow::Result<()> {
    let harness = setup().await?;
    let donations = &harness.services.donation_service;

    let checkout = donations.create(donation_request(100.0)).await?;

    let mut forged = signed_callback(&checkout.order_id, "pay_don_3");
    forged.signature = "f".repeat(64);
    let err = donations.confirm(forged).await.unwrap_err();
    assert!(matches!(err, AppError::Verification(_)));

    let donation = donations.get(checkout.donation_id).await?;
    assert_eq!(donation.status, DonationStatus::Pending);

    Ok(())
}

#[tokio::test]
async fn closing_distinguishes_abandonment_from_failure() -> anyhow::Result<()> {
    let harness = setup().await?;
    let donations = &harness.services.donation_service;

    let abandoned = donations.create(donation_request(50.0)).await?;
    let donation = donations.close(abandoned.donation_id, true).await?;
    assert_eq!(donation.status, DonationStatus::Cancelled);

    let failed = donations.create(donation_request(75.0)).await?;
    let donation = donations.close(failed.donation_id, false).await?;
    assert_eq!(donation.status, DonationStatus::Failed);

    Ok(())
}

#[tokio::test]
async fn closed_donation_cannot_be_completed() -> anyhow::Result<()> {
    let harness = setup().await?;
    let donations = &harness.services.donation_service;

    let checkout = donations.create(donation_request(60.0)).await?;
    donations.close(checkout.donation_id, true).await?;

    let err = donations
        .confirm(signed_callback(&checkout.order_id, "pay_don_4"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ConflictingCompletion(_)));

    let donation = donations.get(checkout.donation_id).await?;
    assert_eq!(donation.status, DonationStatus::Cancelled);

    Ok(())
}
