use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::MembershipConfig,
    domain::*,
    error::{AppError, Result},
    notifications::{NotificationDispatcher, NotificationEvent},
    repository::{MemberRepository, PaymentRepository},
    service::certificate_service::CertificateService,
};

/// Membership term granted on approval and on each renewal.
pub const MEMBERSHIP_TERM_DAYS: i64 = 365;

pub struct MemberService {
    member_repo: Arc<dyn MemberRepository>,
    payment_repo: Arc<dyn PaymentRepository>,
    certificate_service: Arc<CertificateService>,
    dispatcher: Arc<NotificationDispatcher>,
    membership: MembershipConfig,
}

impl MemberService {
    pub fn new(
        member_repo: Arc<dyn MemberRepository>,
        payment_repo: Arc<dyn PaymentRepository>,
        certificate_service: Arc<CertificateService>,
        dispatcher: Arc<NotificationDispatcher>,
        membership: MembershipConfig,
    ) -> Self {
        Self {
            member_repo,
            payment_repo,
            certificate_service,
            dispatcher,
            membership,
        }
    }

    pub async fn register(&self, request: RegistrationRequest) -> Result<Member> {
        request.validate().map_err(|e| {
            let messages: Vec<String> = e
                .field_errors()
                .into_values()
                .flatten()
                .filter_map(|err| err.message.as_ref().map(|m| m.to_string()))
                .collect();
            AppError::Validation(messages.join("; "))
        })?;

        // The unique constraint is the real guard; this check just gives a
        // cleaner error before we hit the insert.
        if self.member_repo.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        self.member_repo.create(request).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Member> {
        self.member_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Member>> {
        self.member_repo.find_by_email(email).await
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Member>> {
        self.member_repo.list(limit, offset).await
    }

    pub async fn list_by_status(&self, status: MemberStatus) -> Result<Vec<Member>> {
        self.member_repo.list_by_status(status).await
    }

    /// Approves a pending member: requires a completed registration payment,
    /// mints a membership id from the atomic sequence, and sets the expiry
    /// one membership term out. Certificate and emails are best-effort side
    /// effects dispatched after the approval has committed.
    pub async fn approve(&self, id: Uuid) -> Result<Member> {
        let member = self.get(id).await?;

        if member.status != MemberStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Member is not pending approval (current status: {:?})",
                member.status
            )));
        }

        if !self
            .payment_repo
            .has_completed(id, PaymentType::Registration)
            .await?
        {
            return Err(AppError::Validation(
                "Cannot approve a member without a completed registration payment".to_string(),
            ));
        }

        let sequence = self.member_repo.next_membership_sequence().await?;
        let membership_id = format!("{} {:04}", self.membership.id_prefix, sequence);
        let now = Utc::now();
        let expiry_date = now + Duration::days(MEMBERSHIP_TERM_DAYS);

        let member = self
            .member_repo
            .approve(id, &membership_id, expiry_date, now)
            .await?;

        self.dispatcher
            .dispatch(NotificationEvent::MemberApproved(member.clone()))
            .await;

        // Best-effort: a renderer or storage failure never rolls back the
        // approval. The certificate can be regenerated later.
        match self.certificate_service.issue(&member).await {
            Ok(certificate) => {
                self.dispatcher
                    .dispatch(NotificationEvent::CertificateIssued {
                        member: member.clone(),
                        certificate,
                    })
                    .await;
            }
            Err(e) => {
                tracing::warn!("Certificate issuance failed for {}: {:?}", member.id, e);
            }
        }

        Ok(member)
    }

    pub async fn reject(&self, id: Uuid) -> Result<Member> {
        let member = self.member_repo.reject(id).await?;

        self.dispatcher
            .dispatch(NotificationEvent::MemberRejected(member.clone()))
            .await;

        Ok(member)
    }

    /// Extends the membership by one full term from now, not from the old
    /// expiry date, so a long-lapsed member still gets exactly one term.
    pub async fn extend_membership(&self, id: Uuid) -> Result<Member> {
        let member = self.get(id).await?;

        if !member.is_renewable(Utc::now()) {
            return Err(AppError::Conflict(format!(
                "Membership cannot be renewed (current status: {:?})",
                member.standing(Utc::now())
            )));
        }

        let new_expiry = Utc::now() + Duration::days(MEMBERSHIP_TERM_DAYS);
        self.member_repo.extend_membership(id, new_expiry).await
    }

    /// Regenerates the certificate for an approved member; a new row and
    /// artifact are created, the old ones stay untouched.
    pub async fn reissue_certificate(&self, id: Uuid) -> Result<Certificate> {
        let member = self.get(id).await?;

        if member.status != MemberStatus::Approved {
            return Err(AppError::Conflict(
                "Certificates can only be issued for approved members".to_string(),
            ));
        }

        let certificate = self.certificate_service.issue(&member).await?;

        self.dispatcher
            .dispatch(NotificationEvent::CertificateIssued {
                member,
                certificate: certificate.clone(),
            })
            .await;

        Ok(certificate)
    }

    pub async fn stats(&self) -> Result<MemberStats> {
        Ok(MemberStats {
            pending: self.member_repo.count_by_status(MemberStatus::Pending).await?,
            approved: self.member_repo.count_by_status(MemberStatus::Approved).await?,
            rejected: self.member_repo.count_by_status(MemberStatus::Rejected).await?,
        })
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MemberStats {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}
