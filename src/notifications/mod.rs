use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::{Certificate, Donation, Member, Payment};
use crate::error::Result;

pub mod mailer;

pub use mailer::EmailNotifier;

/// State transitions that trigger best-effort side effects. Dispatched only
/// after the durable transition has committed; handler failures are logged
/// and never roll the transition back.
#[derive(Debug, Clone)]
pub enum NotificationEvent {
    MemberApproved(Member),
    MemberRejected(Member),
    PaymentCompleted { payment: Payment, member: Option<Member> },
    DonationCompleted(Donation),
    CertificateIssued { member: Member, certificate: Certificate },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;
    fn is_enabled(&self) -> bool;
    async fn handle_event(&self, event: &NotificationEvent) -> Result<()>;
}

pub struct NotificationDispatcher {
    notifiers: RwLock<Vec<Arc<dyn Notifier>>>,
}

impl NotificationDispatcher {
    pub fn new() -> Self {
        Self {
            notifiers: RwLock::new(Vec::new()),
        }
    }

    pub async fn register(&self, notifier: Arc<dyn Notifier>) {
        if notifier.is_enabled() {
            let mut notifiers = self.notifiers.write().await;
            notifiers.push(notifier);
            tracing::info!("Registered notifier: {}", notifiers.last().unwrap().name());
        }
    }

    pub async fn dispatch(&self, event: NotificationEvent) {
        let notifiers = self.notifiers.read().await;

        for notifier in notifiers.iter() {
            if !notifier.is_enabled() {
                continue;
            }

            match notifier.handle_event(&event).await {
                Ok(_) => {
                    tracing::debug!("Notifier {} handled event successfully", notifier.name());
                }
                Err(e) => {
                    tracing::error!(
                        "Notifier {} failed to handle event: {:?}",
                        notifier.name(),
                        e
                    );
                    // Continue with the remaining notifiers even if one fails
                }
            }
        }
    }
}

impl Default for NotificationDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
