pub mod certificate_service;
pub mod donation_service;
pub mod member_service;
pub mod payment_service;

use std::sync::Arc;
use sqlx::SqlitePool;

use crate::auth::AuthService;
use crate::config::MembershipConfig;
use crate::notifications::NotificationDispatcher;
use crate::payments::PaymentGateway;
use crate::repository::*;
use crate::storage::ObjectStore;

pub use certificate_service::{
    CertificateRenderer, CertificateService, DisabledCertificateRenderer, HttpCertificateRenderer,
};
pub use donation_service::{DonationCheckout, DonationService};
pub use member_service::{MemberService, MemberStats, MEMBERSHIP_TERM_DAYS};
pub use payment_service::{CheckoutSession, PaymentService};

pub struct ServiceContext {
    pub member_service: Arc<MemberService>,
    pub payment_service: Arc<PaymentService>,
    pub donation_service: Arc<DonationService>,
    pub certificate_service: Arc<CertificateService>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub auth_service: Arc<AuthService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        member_repo: Arc<dyn MemberRepository>,
        payment_repo: Arc<dyn PaymentRepository>,
        donation_repo: Arc<dyn DonationRepository>,
        certificate_repo: Arc<dyn CertificateRepository>,
        gateway: Arc<dyn PaymentGateway>,
        renderer: Arc<dyn CertificateRenderer>,
        store: Arc<dyn ObjectStore>,
        dispatcher: Arc<NotificationDispatcher>,
        auth_service: Arc<AuthService>,
        membership: MembershipConfig,
        db_pool: SqlitePool,
    ) -> Self {
        let certificate_service = Arc::new(CertificateService::new(
            certificate_repo,
            renderer,
            store,
        ));

        let member_service = Arc::new(MemberService::new(
            member_repo.clone(),
            payment_repo.clone(),
            certificate_service.clone(),
            dispatcher.clone(),
            membership.clone(),
        ));

        let payment_service = Arc::new(PaymentService::new(
            payment_repo,
            member_repo,
            gateway.clone(),
            dispatcher.clone(),
            membership.clone(),
        ));

        let donation_service = Arc::new(DonationService::new(
            donation_repo,
            gateway,
            dispatcher.clone(),
            membership,
        ));

        Self {
            member_service,
            payment_service,
            donation_service,
            certificate_service,
            dispatcher,
            auth_service,
            db_pool,
        }
    }
}
