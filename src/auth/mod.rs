use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use cookie::{Cookie, SameSite};
use sqlx::SqlitePool;
use std::time::Duration as StdDuration;
use uuid::Uuid;

use crate::error::{AppError, Result};

pub mod session;

use session::{Session, SessionStore};

pub struct AuthService {
    pool: SqlitePool,
    session_store: SessionStore,
    admin_check_timeout: StdDuration,
}

impl AuthService {
    pub fn new(pool: SqlitePool, admin_check_timeout_secs: u64) -> Self {
        Self {
            session_store: SessionStore::new(pool.clone()),
            pool,
            admin_check_timeout: StdDuration::from_secs(admin_check_timeout_secs),
        }
    }

    pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

        let argon2 = Argon2::default();

        Ok(argon2.verify_password(password.as_bytes(), &parsed_hash).is_ok())
    }

    pub async fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        Ok(password_hash.to_string())
    }

    pub async fn sign_in(&self, email: &str, password: &str, duration_hours: i64) -> Result<String> {
        let row = sqlx::query_as::<_, (String, String)>(
            "SELECT id, password_hash FROM admin_users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let Some((admin_id, password_hash)) = row else {
            return Err(AppError::Unauthorized);
        };

        if !Self::verify_password(password, &password_hash).await? {
            return Err(AppError::Unauthorized);
        }

        let admin_id =
            Uuid::parse_str(&admin_id).map_err(|e| AppError::Database(e.to_string()))?;

        let token = generate_token();
        let expires_at = Utc::now() + Duration::hours(duration_hours);
        self.session_store.create(admin_id, &token, expires_at).await?;

        Ok(token)
    }

    pub async fn validate_session(&self, token: &str) -> Result<Option<Session>> {
        self.session_store.find_by_token(token).await
    }

    pub async fn sign_out(&self, token: &str) -> Result<()> {
        self.session_store.delete_by_token(token).await
    }

    pub async fn cleanup_expired_sessions(&self) -> Result<u64> {
        self.session_store.cleanup_expired().await
    }

    /// Privileged-status lookup, bounded by the configured timeout. A slow
    /// or failing lookup answers "not privileged" rather than hanging the
    /// request.
    pub async fn is_admin(&self, user_id: Uuid) -> bool {
        let query = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM admin_users WHERE id = ?",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool);

        match tokio::time::timeout(self.admin_check_timeout, query).await {
            Ok(Ok(count)) => count > 0,
            Ok(Err(e)) => {
                tracing::warn!("Admin check failed for {}: {}", user_id, e);
                false
            }
            Err(_) => {
                tracing::warn!("Admin check timed out for {}", user_id);
                false
            }
        }
    }

    pub async fn create_admin(&self, email: &str, password: &str) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let password_hash = Self::hash_password(password).await?;

        sqlx::query(
            "INSERT INTO admin_users (id, email, password_hash, created_at) VALUES (?, ?, ?, CURRENT_TIMESTAMP)",
        )
        .bind(id.to_string())
        .bind(email)
        .bind(&password_hash)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    pub fn create_session_cookie(&self, token: &str, secure: bool) -> Cookie<'static> {
        Cookie::build(("session", token.to_string()))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .secure(secure)
            .max_age(cookie::time::Duration::hours(24))
            .build()
    }

    pub fn create_logout_cookie() -> Cookie<'static> {
        Cookie::build(("session", ""))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .max_age(cookie::time::Duration::seconds(0))
            .build()
    }
}

fn generate_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
