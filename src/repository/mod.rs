use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::domain::*;
use crate::error::Result;

pub mod member_repository;
pub mod payment_repository;
pub mod donation_repository;
pub mod certificate_repository;

pub use member_repository::SqliteMemberRepository;
pub use payment_repository::SqlitePaymentRepository;
pub use donation_repository::SqliteDonationRepository;
pub use certificate_repository::SqliteCertificateRepository;

#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn create(&self, request: RegistrationRequest) -> Result<Member>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Member>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Member>>;
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Member>>;
    async fn list_by_status(&self, status: MemberStatus) -> Result<Vec<Member>>;
    async fn count_by_status(&self, status: MemberStatus) -> Result<i64>;

    /// Atomically increments and returns the membership-id counter.
    async fn next_membership_sequence(&self) -> Result<i64>;

    /// Transitions pending -> approved, setting the minted membership id,
    /// expiry, and approval timestamp. Guarded on prior status so two
    /// concurrent approvals cannot both succeed.
    async fn approve(
        &self,
        id: Uuid,
        membership_id: &str,
        expiry_date: DateTime<Utc>,
        approved_at: DateTime<Utc>,
    ) -> Result<Member>;

    /// Transitions pending -> rejected, guarded on prior status.
    async fn reject(&self, id: Uuid) -> Result<Member>;

    /// Sets a new expiry date on an approved member (renewal). Guarded so
    /// pending/rejected members cannot be extended.
    async fn extend_membership(&self, id: Uuid, new_expiry: DateTime<Utc>) -> Result<Member>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create(&self, payment: Payment) -> Result<Payment>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>>;
    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Payment>>;
    async fn find_by_member(&self, member_id: Uuid) -> Result<Vec<Payment>>;
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Payment>>;

    /// Backfills the gateway order id on a still-pending payment.
    async fn attach_order_id(&self, id: Uuid, order_id: &str) -> Result<Payment>;

    /// Transitions pending -> completed and backfills the gateway
    /// correlation ids. Conditional on the row still being pending.
    async fn complete(&self, id: Uuid, order_id: &str, payment_id: &str) -> Result<Payment>;

    /// Transitions pending -> failed. Terminal rows are left untouched.
    async fn mark_failed(&self, id: Uuid) -> Result<Payment>;

    async fn has_completed(&self, member_id: Uuid, payment_type: PaymentType) -> Result<bool>;
}

#[async_trait]
pub trait DonationRepository: Send + Sync {
    async fn create(&self, donation: Donation) -> Result<Donation>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Donation>>;
    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Donation>>;
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Donation>>;

    /// Transitions pending -> completed, backfilling gateway ids.
    /// Conditional on the row still being pending.
    async fn complete(&self, id: Uuid, order_id: &str, payment_id: &str) -> Result<Donation>;

    /// Transitions pending -> failed or cancelled.
    async fn close(&self, id: Uuid, status: DonationStatus) -> Result<Donation>;
}

#[async_trait]
pub trait CertificateRepository: Send + Sync {
    async fn create(&self, certificate: Certificate) -> Result<Certificate>;
    async fn find_by_member(&self, member_id: Uuid) -> Result<Vec<Certificate>>;
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Certificate>>;
}
