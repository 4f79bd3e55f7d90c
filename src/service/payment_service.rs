use chrono::{Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    config::MembershipConfig,
    domain::*,
    error::{AppError, Result},
    notifications::{NotificationDispatcher, NotificationEvent},
    payments::{PaymentCallback, PaymentGateway},
    repository::{MemberRepository, PaymentRepository},
    service::member_service::MEMBERSHIP_TERM_DAYS,
};

/// Everything the client-side checkout widget needs.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSession {
    pub payment_id: Uuid,
    pub order_id: String,
    pub amount: f64,
    pub amount_paise: i64,
    pub currency: String,
    pub key_id: String,
}

pub struct PaymentService {
    payment_repo: Arc<dyn PaymentRepository>,
    member_repo: Arc<dyn MemberRepository>,
    gateway: Arc<dyn PaymentGateway>,
    dispatcher: Arc<NotificationDispatcher>,
    membership: MembershipConfig,
}

impl PaymentService {
    pub fn new(
        payment_repo: Arc<dyn PaymentRepository>,
        member_repo: Arc<dyn MemberRepository>,
        gateway: Arc<dyn PaymentGateway>,
        dispatcher: Arc<NotificationDispatcher>,
        membership: MembershipConfig,
    ) -> Self {
        Self {
            payment_repo,
            member_repo,
            gateway,
            dispatcher,
            membership,
        }
    }

    /// Creates a pending payment row and reserves a gateway order for it.
    /// Every attempt gets a fresh row; an abandoned checkout leaves its row
    /// pending and never blocks the next attempt.
    pub async fn begin_checkout(
        &self,
        member_id: Uuid,
        payment_type: PaymentType,
        donation_amount: f64,
    ) -> Result<CheckoutSession> {
        if !donation_amount.is_finite() || donation_amount < 0.0 {
            return Err(AppError::Validation(
                "Donation amount must be zero or positive".to_string(),
            ));
        }

        let member = self
            .member_repo
            .find_by_id(member_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

        let fee = match payment_type {
            PaymentType::Registration => {
                if member.status != MemberStatus::Pending {
                    return Err(AppError::Conflict(
                        "Member has already been processed".to_string(),
                    ));
                }
                self.membership.fee
            }
            PaymentType::Renewal => {
                if !member.is_renewable(Utc::now()) {
                    return Err(AppError::Conflict(
                        "Only approved or expired members can renew".to_string(),
                    ));
                }
                self.membership.renewal_fee
            }
            PaymentType::Donation => {
                return Err(AppError::BadRequest(
                    "Standalone donations use the donation flow".to_string(),
                ));
            }
        };

        let quote = FeeBreakdown::quote(fee, donation_amount);
        let now = Utc::now();

        // The pending row exists before the gateway order is requested.
        let payment = self
            .payment_repo
            .create(Payment {
                id: Uuid::new_v4(),
                member_id: Some(member_id),
                amount: quote.total,
                membership_fee: quote.membership_fee,
                gateway_charges: quote.gateway_charges,
                donation_amount: quote.donation_amount,
                payment_type,
                status: PaymentStatus::Pending,
                gateway_order_id: None,
                gateway_payment_id: None,
                created_at: now,
                updated_at: now,
            })
            .await?;

        let receipt = format!("receipt_{}", payment.id.simple());
        let order_id = self
            .gateway
            .create_order(quote.total_paise(), &self.membership.currency, &receipt)
            .await?;

        let payment = self.payment_repo.attach_order_id(payment.id, &order_id).await?;

        Ok(CheckoutSession {
            payment_id: payment.id,
            order_id,
            amount: payment.amount,
            amount_paise: quote.total_paise(),
            currency: self.membership.currency.clone(),
            key_id: self.gateway.key_id().to_string(),
        })
    }

    /// Settles a gateway success callback. Signature verification is the
    /// sole gate: on any failure every record stays in its prior state.
    pub async fn confirm(&self, callback: PaymentCallback) -> Result<Payment> {
        self.gateway.verify_callback(&callback)?;

        let payment = self
            .payment_repo
            .find_by_order_id(&callback.order_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No payment for order {}", callback.order_id))
            })?;

        let payment = self
            .payment_repo
            .complete(payment.id, &callback.order_id, &callback.payment_id)
            .await?;

        let member = match (payment.payment_type, payment.member_id) {
            (PaymentType::Renewal, Some(member_id)) => {
                // One full term from the moment of renewal, regardless of
                // how overdue the previous expiry was.
                let new_expiry = Utc::now() + Duration::days(MEMBERSHIP_TERM_DAYS);
                Some(self.member_repo.extend_membership(member_id, new_expiry).await?)
            }
            // Registration success does not imply approval; the member
            // stays pending until an admin acts.
            (_, Some(member_id)) => self.member_repo.find_by_id(member_id).await?,
            (_, None) => None,
        };

        self.dispatcher
            .dispatch(NotificationEvent::PaymentCompleted {
                payment: payment.clone(),
                member,
            })
            .await;

        Ok(payment)
    }

    /// Records a gateway-reported failure. Missing rows are tolerated: the
    /// user may have abandoned checkout before an order was attached.
    pub async fn fail(&self, order_id: &str, reason: &str) -> Result<Option<Payment>> {
        tracing::warn!("Payment failed for order {}: {}", order_id, reason);

        match self.payment_repo.find_by_order_id(order_id).await? {
            Some(payment) => Ok(Some(self.payment_repo.mark_failed(payment.id).await?)),
            None => Ok(None),
        }
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Payment>> {
        self.payment_repo.list(limit, offset).await
    }

    pub async fn list_for_member(&self, member_id: Uuid) -> Result<Vec<Payment>> {
        self.payment_repo.find_by_member(member_id).await
    }
}
