use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Donation, DonationStatus},
    error::{AppError, Result},
    repository::DonationRepository,
};

#[derive(FromRow)]
struct DonationRow {
    id: String,
    donor_name: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    amount: f64,
    remarks: Option<String>,
    status: String,
    gateway_order_id: Option<String>,
    gateway_payment_id: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

const DONATION_COLUMNS: &str = r#"
    id, donor_name, phone, email, amount, remarks, status,
    gateway_order_id, gateway_payment_id, created_at, updated_at
"#;

pub struct SqliteDonationRepository {
    pool: SqlitePool,
}

impl SqliteDonationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_donation(row: DonationRow) -> Result<Donation> {
        Ok(Donation {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            donor_name: row.donor_name,
            phone: row.phone,
            email: row.email,
            amount: row.amount,
            remarks: row.remarks,
            status: Self::parse_status(&row.status)?,
            gateway_order_id: row.gateway_order_id,
            gateway_payment_id: row.gateway_payment_id,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn parse_status(s: &str) -> Result<DonationStatus> {
        match s {
            "Pending" => Ok(DonationStatus::Pending),
            "Completed" => Ok(DonationStatus::Completed),
            "Failed" => Ok(DonationStatus::Failed),
            "Cancelled" => Ok(DonationStatus::Cancelled),
            _ => Err(AppError::Database(format!("Invalid donation status: {}", s))),
        }
    }

    fn status_to_str(status: &DonationStatus) -> &'static str {
        match status {
            DonationStatus::Pending => "Pending",
            DonationStatus::Completed => "Completed",
            DonationStatus::Failed => "Failed",
            DonationStatus::Cancelled => "Cancelled",
        }
    }
}

#[async_trait]
impl DonationRepository for SqliteDonationRepository {
    async fn create(&self, donation: Donation) -> Result<Donation> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO donations (
                id, donor_name, phone, email, amount, remarks, status,
                gateway_order_id, gateway_payment_id, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(donation.id.to_string())
        .bind(&donation.donor_name)
        .bind(&donation.phone)
        .bind(&donation.email)
        .bind(donation.amount)
        .bind(&donation.remarks)
        .bind(Self::status_to_str(&donation.status))
        .bind(&donation.gateway_order_id)
        .bind(&donation.gateway_payment_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.find_by_id(donation.id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created donation".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Donation>> {
        let row = sqlx::query_as::<_, DonationRow>(&format!(
            "SELECT {} FROM donations WHERE id = ?",
            DONATION_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(Self::row_to_donation(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Donation>> {
        let row = sqlx::query_as::<_, DonationRow>(&format!(
            "SELECT {} FROM donations WHERE gateway_order_id = ?",
            DONATION_COLUMNS
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(Self::row_to_donation(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Donation>> {
        let rows = sqlx::query_as::<_, DonationRow>(&format!(
            "SELECT {} FROM donations ORDER BY created_at DESC LIMIT ? OFFSET ?",
            DONATION_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_donation).collect()
    }

    async fn complete(&self, id: Uuid, order_id: &str, payment_id: &str) -> Result<Donation> {
        let result = sqlx::query(
            r#"
            UPDATE donations
            SET status = 'Completed',
                gateway_order_id = ?,
                gateway_payment_id = ?,
                updated_at = ?
            WHERE id = ? AND status = 'Pending'
            "#,
        )
        .bind(order_id)
        .bind(payment_id)
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        let donation = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Donation not found".to_string()))?;

        if result.rows_affected() == 0 {
            // Idempotent on redelivery of the same confirmation; a different
            // gateway payment id against a settled row is a real conflict.
            if donation.status == DonationStatus::Completed
                && donation.gateway_payment_id.as_deref() == Some(payment_id)
            {
                return Ok(donation);
            }
            return Err(AppError::ConflictingCompletion(
                "Donation already completed with a different gateway payment id".to_string(),
            ));
        }

        Ok(donation)
    }

    async fn close(&self, id: Uuid, status: DonationStatus) -> Result<Donation> {
        if !matches!(status, DonationStatus::Failed | DonationStatus::Cancelled) {
            return Err(AppError::BadRequest(
                "Donations can only be closed as failed or cancelled".to_string(),
            ));
        }

        sqlx::query(
            "UPDATE donations SET status = ?, updated_at = ? WHERE id = ? AND status = 'Pending'",
        )
        .bind(Self::status_to_str(&status))
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Donation not found".to_string()))
    }
}
