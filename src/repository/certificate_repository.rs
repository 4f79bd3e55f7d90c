use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::Certificate,
    error::{AppError, Result},
    repository::CertificateRepository,
};

#[derive(FromRow)]
struct CertificateRow {
    id: String,
    member_id: String,
    certificate_number: String,
    pdf_url: String,
    valid_until: NaiveDateTime,
    generated_at: NaiveDateTime,
    created_at: NaiveDateTime,
}

const CERTIFICATE_COLUMNS: &str = r#"
    id, member_id, certificate_number, pdf_url, valid_until,
    generated_at, created_at
"#;

pub struct SqliteCertificateRepository {
    pool: SqlitePool,
}

impl SqliteCertificateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_certificate(row: CertificateRow) -> Result<Certificate> {
        Ok(Certificate {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            member_id: Uuid::parse_str(&row.member_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            certificate_number: row.certificate_number,
            pdf_url: row.pdf_url,
            valid_until: DateTime::from_naive_utc_and_offset(row.valid_until, Utc),
            generated_at: DateTime::from_naive_utc_and_offset(row.generated_at, Utc),
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }
}

#[async_trait]
impl CertificateRepository for SqliteCertificateRepository {
    async fn create(&self, certificate: Certificate) -> Result<Certificate> {
        sqlx::query(
            r#"
            INSERT INTO certificates (
                id, member_id, certificate_number, pdf_url, valid_until,
                generated_at, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(certificate.id.to_string())
        .bind(certificate.member_id.to_string())
        .bind(&certificate.certificate_number)
        .bind(&certificate.pdf_url)
        .bind(certificate.valid_until.naive_utc())
        .bind(certificate.generated_at.naive_utc())
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, CertificateRow>(&format!(
            "SELECT {} FROM certificates WHERE id = ?",
            CERTIFICATE_COLUMNS
        ))
        .bind(certificate.id.to_string())
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_certificate(row)
    }

    async fn find_by_member(&self, member_id: Uuid) -> Result<Vec<Certificate>> {
        let rows = sqlx::query_as::<_, CertificateRow>(&format!(
            "SELECT {} FROM certificates WHERE member_id = ? ORDER BY generated_at DESC",
            CERTIFICATE_COLUMNS
        ))
        .bind(member_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_certificate).collect()
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Certificate>> {
        let rows = sqlx::query_as::<_, CertificateRow>(&format!(
            "SELECT {} FROM certificates ORDER BY generated_at DESC LIMIT ? OFFSET ?",
            CERTIFICATE_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_certificate).collect()
    }
}
