#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Mutex;
use tempfile::TempDir;

use samiti::{
    api,
    auth::AuthService,
    config::{MembershipConfig, Settings},
    domain::{CertificateData, RegistrationRequest},
    error::Result,
    notifications::NotificationDispatcher,
    payments::{sign_payment, verify_payment_signature, PaymentCallback, PaymentGateway},
    repository::{
        SqliteCertificateRepository, SqliteDonationRepository, SqliteMemberRepository,
        SqlitePaymentRepository,
    },
    service::{CertificateRenderer, ServiceContext},
    storage::{LocalObjectStore, ObjectStore},
};

pub const TEST_KEY_SECRET: &str = "test_key_secret";

/// In-process stand-in for the payment gateway. Orders get sequential ids
/// and callbacks are verified against the shared test secret, so tests can
/// mint valid and invalid signatures at will.
pub struct FakeGateway {
    counter: AtomicU64,
    orders: Mutex<Vec<i64>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
            orders: Mutex::new(Vec::new()),
        }
    }

    pub fn order_count(&self) -> usize {
        self.orders.lock().unwrap().len()
    }

    pub fn last_order_paise(&self) -> Option<i64> {
        self.orders.lock().unwrap().last().copied()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    fn key_id(&self) -> &str {
        "rzp_test_fake"
    }

    async fn create_order(
        &self,
        amount_paise: i64,
        _currency: &str,
        _receipt: &str,
    ) -> Result<String> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.orders.lock().unwrap().push(amount_paise);
        Ok(format!("order_test_{}", n))
    }

    fn verify_callback(
        &self,
        callback: &PaymentCallback,
    ) -> std::result::Result<(), samiti::payments::VerificationError> {
        verify_payment_signature(
            TEST_KEY_SECRET,
            &callback.order_id,
            &callback.payment_id,
            &callback.signature,
        )
    }
}

/// Produces the callback the gateway would send on a successful payment.
pub fn signed_callback(order_id: &str, payment_id: &str) -> PaymentCallback {
    PaymentCallback {
        order_id: order_id.to_string(),
        payment_id: payment_id.to_string(),
        signature: sign_payment(TEST_KEY_SECRET, order_id, payment_id),
    }
}

pub struct FakeRenderer;

#[async_trait]
impl CertificateRenderer for FakeRenderer {
    async fn render(&self, _data: &CertificateData) -> Result<Vec<u8>> {
        Ok(b"%PDF-1.4 test".to_vec())
    }
}

pub struct TestHarness {
    pub services: Arc<ServiceContext>,
    pub gateway: Arc<FakeGateway>,
    pub pool: SqlitePool,
    pub store: Arc<dyn ObjectStore>,
    _storage: TempDir,
}

impl TestHarness {
    pub fn app(&self) -> axum::Router {
        api::create_app(
            self.services.clone(),
            self.store.clone(),
            Arc::new(Settings::default()),
        )
    }
}

pub async fn setup() -> anyhow::Result<TestHarness> {
    let pool = SqlitePool::connect(":memory:").await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let storage = TempDir::new()?;
    let store: Arc<dyn ObjectStore> = Arc::new(LocalObjectStore::new(
        storage.path().to_str().ok_or_else(|| anyhow::anyhow!("non-utf8 temp dir"))?,
        "http://localhost:8080/storage",
    ));

    let gateway = Arc::new(FakeGateway::new());
    let dispatcher = Arc::new(NotificationDispatcher::new());
    let auth_service = Arc::new(AuthService::new(pool.clone(), 5));

    let services = Arc::new(ServiceContext::new(
        Arc::new(SqliteMemberRepository::new(pool.clone())),
        Arc::new(SqlitePaymentRepository::new(pool.clone())),
        Arc::new(SqliteDonationRepository::new(pool.clone())),
        Arc::new(SqliteCertificateRepository::new(pool.clone())),
        gateway.clone(),
        Arc::new(FakeRenderer),
        store.clone(),
        dispatcher,
        auth_service,
        MembershipConfig::default(),
        pool.clone(),
    ));

    Ok(TestHarness {
        services,
        gateway,
        pool,
        store,
        _storage: storage,
    })
}

pub fn registration(email: &str) -> RegistrationRequest {
    RegistrationRequest {
        company_name: "Mahadeva Agro Traders".to_string(),
        contact_person: "Suresh Kumar".to_string(),
        mobile: "9876543210".to_string(),
        alternate_phone: None,
        email: email.to_string(),
        address: "12 Market Road".to_string(),
        city: "Mysuru".to_string(),
        taluk: "Mysuru".to_string(),
        district: "Mysuru".to_string(),
        state: "Karnataka".to_string(),
        pin_code: "570001".to_string(),
        gstin: None,
        category: "Wholesale".to_string(),
        license_url: "http://localhost:8080/storage/documents/license.pdf".to_string(),
        id_proof_url: "http://localhost:8080/storage/documents/id.pdf".to_string(),
    }
}
