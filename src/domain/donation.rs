use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Donation {
    pub id: Uuid,
    pub donor_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub amount: f64,
    pub remarks: Option<String>,
    pub status: DonationStatus,
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    Pending,
    Completed,
    Failed,
    /// User abandoned the checkout widget.
    Cancelled,
}

impl DonationStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DonationStatus::Pending)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDonationRequest {
    pub donor_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub amount: f64,
    pub remarks: Option<String>,
}
