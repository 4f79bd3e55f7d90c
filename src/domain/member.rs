use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub company_name: String,
    pub contact_person: String,
    pub mobile: String,
    pub alternate_phone: Option<String>,
    pub email: String,
    pub address: String,
    pub city: String,
    pub taluk: String,
    pub district: String,
    pub state: String,
    pub pin_code: String,
    pub gstin: Option<String>,
    pub category: String,
    pub license_url: Option<String>,
    pub id_proof_url: Option<String>,
    pub status: MemberStatus,
    pub membership_id: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored lifecycle state. "Expired" is intentionally absent: it is derived
/// at read time from an approved member's expiry date, so the date column
/// stays the single source of truth.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Pending,
    Approved,
    Rejected,
}

/// Read-time qualified status reported to callers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MemberStanding {
    Pending,
    Approved,
    Rejected,
    Expired,
}

impl Member {
    /// Derives the effective status at `now`. An approved member whose
    /// expiry date has passed reports as expired without any stored change.
    pub fn standing(&self, now: DateTime<Utc>) -> MemberStanding {
        match self.status {
            MemberStatus::Pending => MemberStanding::Pending,
            MemberStatus::Rejected => MemberStanding::Rejected,
            MemberStatus::Approved => match self.expiry_date {
                Some(expiry) if expiry < now => MemberStanding::Expired,
                _ => MemberStanding::Approved,
            },
        }
    }

    pub fn is_renewable(&self, now: DateTime<Utc>) -> bool {
        matches!(
            self.standing(now),
            MemberStanding::Approved | MemberStanding::Expired
        )
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegistrationRequest {
    #[validate(length(min = 1, message = "Company name is required"))]
    pub company_name: String,
    #[validate(length(min = 1, message = "Contact person is required"))]
    pub contact_person: String,
    #[validate(length(min = 10, max = 15, message = "Mobile number is invalid"))]
    pub mobile: String,
    pub alternate_phone: Option<String>,
    #[validate(email(message = "Email address is invalid"))]
    pub email: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "Taluk is required"))]
    pub taluk: String,
    #[validate(length(min = 1, message = "District is required"))]
    pub district: String,
    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,
    #[validate(length(min = 6, max = 6, message = "PIN code must be 6 digits"))]
    pub pin_code: String,
    pub gstin: Option<String>,
    #[validate(length(min = 1, message = "Business category is required"))]
    pub category: String,
    /// Both supporting documents must already be uploaded; registration is
    /// rejected without them.
    #[validate(url(message = "License document URL is invalid"))]
    pub license_url: String,
    #[validate(url(message = "ID proof document URL is invalid"))]
    pub id_proof_url: String,
}
