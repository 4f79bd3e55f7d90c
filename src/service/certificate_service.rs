use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{Certificate, CertificateData, Member},
    error::{AppError, Result},
    repository::CertificateRepository,
    storage::{save_certificate_pdf, ObjectStore},
};

/// Renders certificate PDF bytes. Layout is a collaborator concern; the
/// workflow only needs durable bytes back.
#[async_trait]
pub trait CertificateRenderer: Send + Sync {
    async fn render(&self, data: &CertificateData) -> Result<Vec<u8>>;
}

/// Delegates rendering to an external HTTP service that accepts the
/// certificate data as JSON and returns the PDF body.
pub struct HttpCertificateRenderer {
    http: reqwest::Client,
    render_url: String,
}

impl HttpCertificateRenderer {
    pub fn new(render_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            render_url,
        }
    }
}

#[async_trait]
impl CertificateRenderer for HttpCertificateRenderer {
    async fn render(&self, data: &CertificateData) -> Result<Vec<u8>> {
        let response = self
            .http
            .post(&self.render_url)
            .json(data)
            .send()
            .await
            .map_err(|e| AppError::Certificate(format!("Render request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Certificate(format!(
                "Renderer returned {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Certificate(format!("Failed to read rendered PDF: {}", e)))?;

        Ok(bytes.to_vec())
    }
}

/// Stand-in used when no renderer endpoint is configured. Approval still
/// succeeds; the certificate step is logged and skipped.
pub struct DisabledCertificateRenderer;

#[async_trait]
impl CertificateRenderer for DisabledCertificateRenderer {
    async fn render(&self, _data: &CertificateData) -> Result<Vec<u8>> {
        Err(AppError::Certificate(
            "No certificate renderer is configured".to_string(),
        ))
    }
}

/// Mints certificate rows for approved members. Issuance is append-only:
/// regenerating never mutates an earlier row or artifact.
pub struct CertificateService {
    certificate_repo: Arc<dyn CertificateRepository>,
    renderer: Arc<dyn CertificateRenderer>,
    store: Arc<dyn ObjectStore>,
}

impl CertificateService {
    pub fn new(
        certificate_repo: Arc<dyn CertificateRepository>,
        renderer: Arc<dyn CertificateRenderer>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            certificate_repo,
            renderer,
            store,
        }
    }

    pub async fn issue(&self, member: &Member) -> Result<Certificate> {
        let certificate_number = member.membership_id.clone().ok_or_else(|| {
            AppError::Certificate("Member has no membership id yet".to_string())
        })?;
        let valid_until = member.expiry_date.ok_or_else(|| {
            AppError::Certificate("Member has no expiry date yet".to_string())
        })?;

        let generated_at = Utc::now();
        let data = CertificateData {
            certificate_number: certificate_number.clone(),
            member_name: member.contact_person.clone(),
            company_name: member.company_name.clone(),
            city: member.city.clone(),
            district: member.district.clone(),
            issue_date: generated_at,
            valid_until,
        };

        let pdf_bytes = self.renderer.render(&data).await?;
        let pdf_url = save_certificate_pdf(self.store.as_ref(), &certificate_number, &pdf_bytes)
            .await?;

        let certificate = Certificate {
            id: Uuid::new_v4(),
            member_id: member.id,
            certificate_number,
            pdf_url,
            valid_until,
            generated_at,
            created_at: generated_at,
        };

        self.certificate_repo.create(certificate).await
    }

    pub async fn list_for_member(&self, member_id: Uuid) -> Result<Vec<Certificate>> {
        self.certificate_repo.find_by_member(member_id).await
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Certificate>> {
        self.certificate_repo.list(limit, offset).await
    }
}
