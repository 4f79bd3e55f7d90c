use async_trait::async_trait;
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::{
    config::SmtpConfig,
    error::{AppError, Result},
    notifications::{NotificationEvent, Notifier},
};

/// SMTP-backed status-change emails. Every send is best-effort: a delivery
/// failure is surfaced as a NotificationError to the dispatcher, which logs
/// it and moves on.
pub struct EmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    enabled: bool,
}

impl EmailNotifier {
    pub fn new(config: &SmtpConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }

        let (host, username, password, from_address) = match (
            &config.host,
            &config.username,
            &config.password,
            &config.from_address,
        ) {
            (Some(h), Some(u), Some(p), Some(f)) => (h, u.clone(), p.clone(), f.clone()),
            _ => {
                tracing::warn!("SMTP enabled but missing configuration");
                return None;
            }
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map_err(|e| tracing::warn!("Invalid SMTP relay host: {}", e))
            .ok()?
            .credentials(Credentials::new(username, password))
            .build();

        Some(Self {
            transport,
            from_address,
            enabled: true,
        })
    }

    pub async fn send(&self, to: &str, subject: &str, html: &str) -> Result<()> {
        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|e| AppError::Notification(format!("Invalid from address: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| AppError::Notification(format!("Invalid recipient: {}", e)))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())
            .map_err(|e| AppError::Notification(format!("Failed to build email: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::Notification(format!("Failed to send email: {}", e)))?;

        tracing::info!("Sent email to {}: {}", to, subject);
        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &str {
        "Email"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn handle_event(&self, event: &NotificationEvent) -> Result<()> {
        match event {
            NotificationEvent::MemberApproved(member) => {
                let html = format!(
                    "<p>Dear {},</p>\
                     <p>Your membership application for {} has been approved.</p>\
                     <p>Membership ID: <strong>{}</strong></p>\
                     <p>Your membership certificate will follow in a separate email.</p>",
                    member.contact_person,
                    member.company_name,
                    member.membership_id.as_deref().unwrap_or("-"),
                );
                self.send(&member.email, "Membership approved", &html).await
            }
            NotificationEvent::MemberRejected(member) => {
                let html = format!(
                    "<p>Dear {},</p>\
                     <p>We regret to inform you that the membership application for {} \
                     could not be accepted at this time.</p>\
                     <p>Please contact the association office for details.</p>",
                    member.contact_person, member.company_name,
                );
                self.send(&member.email, "Membership application update", &html)
                    .await
            }
            NotificationEvent::PaymentCompleted { payment, member } => {
                let Some(member) = member else {
                    return Ok(());
                };
                let html = format!(
                    "<p>Dear {},</p>\
                     <p>We have received your payment of ₹{:.2} (reference {}).</p>\
                     <p>Thank you.</p>",
                    member.contact_person,
                    payment.amount,
                    payment.gateway_payment_id.as_deref().unwrap_or("-"),
                );
                self.send(&member.email, "Payment received", &html).await
            }
            NotificationEvent::DonationCompleted(donation) => {
                let Some(email) = donation.email.as_deref() else {
                    return Ok(());
                };
                let html = format!(
                    "<p>Dear {},</p>\
                     <p>Thank you for your generous donation of ₹{:.2}.</p>",
                    donation.donor_name.as_deref().unwrap_or("donor"),
                    donation.amount,
                );
                self.send(email, "Thank you for your donation", &html).await
            }
            NotificationEvent::CertificateIssued { member, certificate } => {
                let html = format!(
                    "<p>Dear {},</p>\
                     <p>Congratulations! Your membership certificate has been issued.</p>\
                     <p>You can view and download it using the link below:</p>\
                     <p><a href=\"{}\">Download Certificate</a></p>",
                    member.contact_person, certificate.pdf_url,
                );
                self.send(&member.email, "Your membership certificate", &html)
                    .await
            }
        }
    }
}
