use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Member, MemberStatus, RegistrationRequest},
    error::{AppError, Result},
    repository::MemberRepository,
};

// Database row struct that matches the SQLite schema
#[derive(FromRow)]
struct MemberRow {
    id: String,
    company_name: String,
    contact_person: String,
    mobile: String,
    alternate_phone: Option<String>,
    email: String,
    address: String,
    city: String,
    taluk: String,
    district: String,
    state: String,
    pin_code: String,
    gstin: Option<String>,
    category: String,
    license_url: Option<String>,
    id_proof_url: Option<String>,
    status: String,
    membership_id: Option<String>,
    expiry_date: Option<NaiveDateTime>,
    approved_at: Option<NaiveDateTime>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

const MEMBER_COLUMNS: &str = r#"
    id, company_name, contact_person, mobile, alternate_phone, email,
    address, city, taluk, district, state, pin_code, gstin, category,
    license_url, id_proof_url, status, membership_id, expiry_date,
    approved_at, created_at, updated_at
"#;

pub struct SqliteMemberRepository {
    pool: SqlitePool,
}

impl SqliteMemberRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_member(row: MemberRow) -> Result<Member> {
        Ok(Member {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            company_name: row.company_name,
            contact_person: row.contact_person,
            mobile: row.mobile,
            alternate_phone: row.alternate_phone,
            email: row.email,
            address: row.address,
            city: row.city,
            taluk: row.taluk,
            district: row.district,
            state: row.state,
            pin_code: row.pin_code,
            gstin: row.gstin,
            category: row.category,
            license_url: row.license_url,
            id_proof_url: row.id_proof_url,
            status: Self::parse_status(&row.status)?,
            membership_id: row.membership_id,
            expiry_date: row
                .expiry_date
                .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
            approved_at: row
                .approved_at
                .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn parse_status(s: &str) -> Result<MemberStatus> {
        match s {
            "Pending" => Ok(MemberStatus::Pending),
            "Approved" => Ok(MemberStatus::Approved),
            "Rejected" => Ok(MemberStatus::Rejected),
            _ => Err(AppError::Database(format!("Invalid member status: {}", s))),
        }
    }

    fn status_to_str(status: &MemberStatus) -> &'static str {
        match status {
            MemberStatus::Pending => "Pending",
            MemberStatus::Approved => "Approved",
            MemberStatus::Rejected => "Rejected",
        }
    }
}

#[async_trait]
impl MemberRepository for SqliteMemberRepository {
    async fn create(&self, request: RegistrationRequest) -> Result<Member> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();
        let id_str = id.to_string();

        sqlx::query(
            r#"
            INSERT INTO members (
                id, company_name, contact_person, mobile, alternate_phone,
                email, address, city, taluk, district, state, pin_code,
                gstin, category, license_url, id_proof_url, status,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&request.company_name)
        .bind(&request.contact_person)
        .bind(&request.mobile)
        .bind(&request.alternate_phone)
        .bind(&request.email)
        .bind(&request.address)
        .bind(&request.city)
        .bind(&request.taluk)
        .bind(&request.district)
        .bind(&request.state)
        .bind(&request.pin_code)
        .bind(&request.gstin)
        .bind(&request.category)
        .bind(&request.license_url)
        .bind(&request.id_proof_url)
        .bind(Self::status_to_str(&MemberStatus::Pending))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created member".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Member>> {
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {} FROM members WHERE id = ?",
            MEMBER_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(Self::row_to_member(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Member>> {
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {} FROM members WHERE email = ?",
            MEMBER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(Self::row_to_member(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Member>> {
        let rows = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {} FROM members ORDER BY created_at DESC LIMIT ? OFFSET ?",
            MEMBER_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_member).collect()
    }

    async fn list_by_status(&self, status: MemberStatus) -> Result<Vec<Member>> {
        let rows = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {} FROM members WHERE status = ? ORDER BY created_at DESC",
            MEMBER_COLUMNS
        ))
        .bind(Self::status_to_str(&status))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_member).collect()
    }

    async fn count_by_status(&self, status: MemberStatus) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM members WHERE status = ?")
            .bind(Self::status_to_str(&status))
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn next_membership_sequence(&self) -> Result<i64> {
        // Single-statement increment; SQLite serializes writers, so two
        // concurrent approvals can never observe the same value.
        let value = sqlx::query_scalar::<_, i64>(
            "UPDATE membership_sequence SET value = value + 1 WHERE id = 1 RETURNING value",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(value)
    }

    async fn approve(
        &self,
        id: Uuid,
        membership_id: &str,
        expiry_date: DateTime<Utc>,
        approved_at: DateTime<Utc>,
    ) -> Result<Member> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

        let result = sqlx::query(
            r#"
            UPDATE members
            SET status = 'Approved',
                membership_id = ?,
                expiry_date = ?,
                approved_at = ?,
                updated_at = ?
            WHERE id = ? AND status = 'Pending'
            "#,
        )
        .bind(membership_id)
        .bind(expiry_date.naive_utc())
        .bind(approved_at.naive_utc())
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Member is not pending approval (current status: {:?})",
                existing.status
            )));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve approved member".to_string()))
    }

    async fn reject(&self, id: Uuid) -> Result<Member> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

        let result = sqlx::query(
            "UPDATE members SET status = 'Rejected', updated_at = ? WHERE id = ? AND status = 'Pending'",
        )
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Member is not pending rejection (current status: {:?})",
                existing.status
            )));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve rejected member".to_string()))
    }

    async fn extend_membership(&self, id: Uuid, new_expiry: DateTime<Utc>) -> Result<Member> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

        let result = sqlx::query(
            r#"
            UPDATE members
            SET expiry_date = ?, updated_at = ?
            WHERE id = ? AND status = 'Approved'
            "#,
        )
        .bind(new_expiry.naive_utc())
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Membership cannot be extended (current status: {:?})",
                existing.status
            )));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve renewed member".to_string()))
    }
}
