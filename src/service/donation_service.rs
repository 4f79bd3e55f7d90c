use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    config::MembershipConfig,
    domain::*,
    error::{AppError, Result},
    notifications::{NotificationDispatcher, NotificationEvent},
    payments::{PaymentCallback, PaymentGateway},
    repository::DonationRepository,
};

#[derive(Debug, Clone, Serialize)]
pub struct DonationCheckout {
    pub donation_id: Uuid,
    pub order_id: String,
    pub amount: f64,
    pub amount_paise: i64,
    pub currency: String,
    pub key_id: String,
}

pub struct DonationService {
    donation_repo: Arc<dyn DonationRepository>,
    gateway: Arc<dyn PaymentGateway>,
    dispatcher: Arc<NotificationDispatcher>,
    membership: MembershipConfig,
}

impl DonationService {
    pub fn new(
        donation_repo: Arc<dyn DonationRepository>,
        gateway: Arc<dyn PaymentGateway>,
        dispatcher: Arc<NotificationDispatcher>,
        membership: MembershipConfig,
    ) -> Self {
        Self {
            donation_repo,
            gateway,
            dispatcher,
            membership,
        }
    }

    /// Validates the amount, reserves a gateway order, then persists the
    /// pending donation with the order id already attached. Validation runs
    /// before any gateway call so a bad amount never reaches the processor.
    pub async fn create(&self, request: CreateDonationRequest) -> Result<DonationCheckout> {
        if !request.amount.is_finite() || request.amount <= 0.0 {
            return Err(AppError::Validation(
                "Donation amount must be a positive number".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        let amount_paise = rupees_to_paise(request.amount);
        let receipt = format!("receipt_{}", id.simple());

        let order_id = self
            .gateway
            .create_order(amount_paise, &self.membership.currency, &receipt)
            .await?;

        let now = Utc::now();
        let donation = self
            .donation_repo
            .create(Donation {
                id,
                donor_name: request.donor_name,
                phone: request.phone,
                email: request.email,
                amount: request.amount,
                remarks: request.remarks,
                status: DonationStatus::Pending,
                gateway_order_id: Some(order_id.clone()),
                gateway_payment_id: None,
                created_at: now,
                updated_at: now,
            })
            .await?;

        Ok(DonationCheckout {
            donation_id: donation.id,
            order_id,
            amount: donation.amount,
            amount_paise,
            currency: self.membership.currency.clone(),
            key_id: self.gateway.key_id().to_string(),
        })
    }

    /// Settles a verified success callback. Idempotent: redelivering the
    /// same gateway payment id is a no-op; a different one is rejected
    /// without touching the row.
    pub async fn confirm(&self, callback: PaymentCallback) -> Result<Donation> {
        self.gateway.verify_callback(&callback)?;

        let donation = self
            .donation_repo
            .find_by_order_id(&callback.order_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No donation for order {}", callback.order_id))
            })?;

        let was_pending = donation.status == DonationStatus::Pending;
        let donation = self
            .donation_repo
            .complete(donation.id, &callback.order_id, &callback.payment_id)
            .await?;

        if was_pending {
            self.dispatcher
                .dispatch(NotificationEvent::DonationCompleted(donation.clone()))
                .await;
        }

        Ok(donation)
    }

    /// Closes a pending donation: `cancelled` when the donor abandoned the
    /// checkout, `failed` when the gateway reported an error.
    pub async fn close(&self, id: Uuid, aborted_by_user: bool) -> Result<Donation> {
        let status = if aborted_by_user {
            DonationStatus::Cancelled
        } else {
            DonationStatus::Failed
        };

        self.donation_repo.close(id, status).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Donation> {
        self.donation_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Donation not found".to_string()))
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Donation>> {
        self.donation_repo.list(limit, offset).await
    }
}
