use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, Result},
    payments::signature::{verify_payment_signature, VerificationError},
};

/// Razorpay refuses orders below 1 INR.
pub const MIN_ORDER_AMOUNT_PAISE: i64 = 100;

/// Success payload delivered by the gateway's checkout widget.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentCallback {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

/// Seam between the workflow and the payment processor. The production
/// implementation talks to the Razorpay REST API; tests substitute a fake.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Public key id handed to the checkout widget.
    fn key_id(&self) -> &str;

    /// Reserves an order with the gateway for `amount_paise` minor units
    /// and returns the gateway's order id.
    async fn create_order(&self, amount_paise: i64, currency: &str, receipt: &str)
        -> Result<String>;

    /// Verifies a success callback against the shared secret.
    fn verify_callback(&self, callback: &PaymentCallback)
        -> std::result::Result<(), VerificationError>;
}

pub struct RazorpayGateway {
    http: reqwest::Client,
    api_base_url: String,
    key_id: String,
    key_secret: String,
}

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

#[derive(Deserialize)]
struct OrderResponse {
    id: String,
}

#[derive(Deserialize)]
struct GatewayErrorResponse {
    error: Option<GatewayErrorDetail>,
}

#[derive(Deserialize)]
struct GatewayErrorDetail {
    description: Option<String>,
}

impl RazorpayGateway {
    pub fn new(api_base_url: String, key_id: String, key_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base_url,
            key_id,
            key_secret,
        }
    }
}

/// Stand-in used when no gateway credentials are configured. Checkout
/// attempts fail with a clear error instead of a connection timeout.
pub struct DisabledGateway;

#[async_trait]
impl PaymentGateway for DisabledGateway {
    fn key_id(&self) -> &str {
        ""
    }

    async fn create_order(
        &self,
        _amount_paise: i64,
        _currency: &str,
        _receipt: &str,
    ) -> Result<String> {
        Err(AppError::Configuration(
            "Payment gateway credentials are not configured".to_string(),
        ))
    }

    fn verify_callback(
        &self,
        _callback: &PaymentCallback,
    ) -> std::result::Result<(), VerificationError> {
        Err(VerificationError::MissingCredentials)
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    fn key_id(&self) -> &str {
        &self.key_id
    }

    async fn create_order(
        &self,
        amount_paise: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<String> {
        if amount_paise < MIN_ORDER_AMOUNT_PAISE {
            return Err(AppError::InvalidAmount(
                "Amount must be at least 1 INR".to_string(),
            ));
        }

        let response = self
            .http
            .post(format!("{}/orders", self.api_base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&CreateOrderBody {
                amount: amount_paise,
                currency,
                receipt,
            })
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("Order request failed: {}", e)))?;

        if !response.status().is_success() {
            let description = response
                .json::<GatewayErrorResponse>()
                .await
                .ok()
                .and_then(|body| body.error)
                .and_then(|detail| detail.description)
                .unwrap_or_else(|| "Failed to create gateway order".to_string());
            return Err(AppError::Gateway(description));
        }

        let order = response
            .json::<OrderResponse>()
            .await
            .map_err(|e| AppError::Gateway(format!("Malformed order response: {}", e)))?;

        tracing::debug!("Created gateway order {}", order.id);
        Ok(order.id)
    }

    fn verify_callback(
        &self,
        callback: &PaymentCallback,
    ) -> std::result::Result<(), VerificationError> {
        verify_payment_signature(
            &self.key_secret,
            &callback.order_id,
            &callback.payment_id,
            &callback.signature,
        )
    }
}
