use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Proof-of-membership artifact. Rows are append-only: regenerating a
/// certificate inserts a new row with a fresh artifact URL rather than
/// mutating the old one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certificate {
    pub id: Uuid,
    pub member_id: Uuid,
    pub certificate_number: String,
    pub pdf_url: String,
    pub valid_until: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Everything the external renderer needs to lay out the PDF.
#[derive(Debug, Clone, Serialize)]
pub struct CertificateData {
    pub certificate_number: String,
    pub member_name: String,
    pub company_name: String,
    pub city: String,
    pub district: String,
    pub issue_date: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}
