use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Payment, PaymentStatus, PaymentType},
    error::{AppError, Result},
    repository::PaymentRepository,
};

#[derive(FromRow)]
struct PaymentRow {
    id: String,
    member_id: Option<String>,
    amount: f64,
    membership_fee: f64,
    gateway_charges: f64,
    donation_amount: f64,
    payment_type: String,
    status: String,
    gateway_order_id: Option<String>,
    gateway_payment_id: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

const PAYMENT_COLUMNS: &str = r#"
    id, member_id, amount, membership_fee, gateway_charges, donation_amount,
    payment_type, status, gateway_order_id, gateway_payment_id,
    created_at, updated_at
"#;

pub struct SqlitePaymentRepository {
    pool: SqlitePool,
}

impl SqlitePaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_payment(row: PaymentRow) -> Result<Payment> {
        let member_id = row
            .member_id
            .map(|s| Uuid::parse_str(&s).map_err(|e| AppError::Database(e.to_string())))
            .transpose()?;

        Ok(Payment {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            member_id,
            amount: row.amount,
            membership_fee: row.membership_fee,
            gateway_charges: row.gateway_charges,
            donation_amount: row.donation_amount,
            payment_type: Self::parse_type(&row.payment_type)?,
            status: Self::parse_status(&row.status)?,
            gateway_order_id: row.gateway_order_id,
            gateway_payment_id: row.gateway_payment_id,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn parse_status(s: &str) -> Result<PaymentStatus> {
        match s {
            "Pending" => Ok(PaymentStatus::Pending),
            "Completed" => Ok(PaymentStatus::Completed),
            "Failed" => Ok(PaymentStatus::Failed),
            _ => Err(AppError::Database(format!("Invalid payment status: {}", s))),
        }
    }

    fn status_to_str(status: &PaymentStatus) -> &'static str {
        match status {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Completed => "Completed",
            PaymentStatus::Failed => "Failed",
        }
    }

    fn parse_type(s: &str) -> Result<PaymentType> {
        match s {
            "Registration" => Ok(PaymentType::Registration),
            "Renewal" => Ok(PaymentType::Renewal),
            "Donation" => Ok(PaymentType::Donation),
            _ => Err(AppError::Database(format!("Invalid payment type: {}", s))),
        }
    }

    fn type_to_str(payment_type: &PaymentType) -> &'static str {
        match payment_type {
            PaymentType::Registration => "Registration",
            PaymentType::Renewal => "Renewal",
            PaymentType::Donation => "Donation",
        }
    }
}

#[async_trait]
impl PaymentRepository for SqlitePaymentRepository {
    async fn create(&self, payment: Payment) -> Result<Payment> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, member_id, amount, membership_fee, gateway_charges,
                donation_amount, payment_type, status, gateway_order_id,
                gateway_payment_id, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(payment.id.to_string())
        .bind(payment.member_id.map(|id| id.to_string()))
        .bind(payment.amount)
        .bind(payment.membership_fee)
        .bind(payment.gateway_charges)
        .bind(payment.donation_amount)
        .bind(Self::type_to_str(&payment.payment_type))
        .bind(Self::status_to_str(&payment.status))
        .bind(&payment.gateway_order_id)
        .bind(&payment.gateway_payment_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.find_by_id(payment.id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created payment".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE id = ?",
            PAYMENT_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(Self::row_to_payment(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Payment>> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE gateway_order_id = ?",
            PAYMENT_COLUMNS
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(Self::row_to_payment(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_member(&self, member_id: Uuid) -> Result<Vec<Payment>> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE member_id = ? ORDER BY created_at DESC",
            PAYMENT_COLUMNS
        ))
        .bind(member_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_payment).collect()
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Payment>> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments ORDER BY created_at DESC LIMIT ? OFFSET ?",
            PAYMENT_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_payment).collect()
    }

    async fn attach_order_id(&self, id: Uuid, order_id: &str) -> Result<Payment> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET gateway_order_id = ?, updated_at = ?
            WHERE id = ? AND status = 'Pending'
            "#,
        )
        .bind(order_id)
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(
                "Cannot attach order to a settled payment".to_string(),
            ));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated payment".to_string()))
    }

    async fn complete(&self, id: Uuid, order_id: &str, payment_id: &str) -> Result<Payment> {
        let result = sqlx::query(
            r#"
            UPDATE payments
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

        let payment = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;

        if result.rows_affected() == 0 {
            // Terminal rows are immutable; re-delivery of the same
            // confirmation is a no-op, anything else is a conflict.
            if payment.status == PaymentStatus::Completed
                && payment.gateway_payment_id.as_deref() == Some(payment_id)
            {
                return Ok(payment);
            }
            return Err(AppError::Conflict(
                "Payment has already been settled".to_string(),
            ));
        }

        Ok(payment)
    }

    async fn mark_failed(&self, id: Uuid) -> Result<Payment> {
        sqlx::query(
            "UPDATE payments SET status = 'Failed', updated_at = ? WHERE id = ? AND status = 'Pending'",
        )
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))
    }

    async fn has_completed(&self, member_id: Uuid, payment_type: PaymentType) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM payments WHERE member_id = ? AND payment_type = ? AND status = 'Completed'",
        )
        .bind(member_id.to_string())
        .bind(Self::type_to_str(&payment_type))
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }
}
