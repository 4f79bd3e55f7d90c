use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use samiti::{
    api, auth,
    config::Settings,
    notifications, payments, repository,
    service::{DisabledCertificateRenderer, HttpCertificateRenderer, ServiceContext},
    storage::LocalObjectStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "samiti=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Pick up a .env file in development
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!(
        "Starting Samiti server on {}:{}",
        settings.server.host,
        settings.server.port
    );

    // Initialize database
    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&db_pool).await?;

    // Initialize auth service
    let auth_service = Arc::new(auth::AuthService::new(
        db_pool.clone(),
        settings.auth.admin_check_timeout_secs,
    ));

    let removed = auth_service.cleanup_expired_sessions().await?;
    if removed > 0 {
        tracing::info!("Removed {} expired sessions", removed);
    }

    // Initialize repositories
    let member_repo = Arc::new(repository::SqliteMemberRepository::new(db_pool.clone()));
    let payment_repo = Arc::new(repository::SqlitePaymentRepository::new(db_pool.clone()));
    let donation_repo = Arc::new(repository::SqliteDonationRepository::new(db_pool.clone()));
    let certificate_repo = Arc::new(repository::SqliteCertificateRepository::new(db_pool.clone()));

    // Initialize the payment gateway if configured
    let gateway: Arc<dyn payments::PaymentGateway> = if settings.razorpay.enabled {
        if let (Some(key_id), Some(key_secret)) = (
            settings.razorpay.key_id.clone(),
            settings.razorpay.key_secret.clone(),
        ) {
            tracing::info!("Razorpay payment processing enabled");
            Arc::new(payments::RazorpayGateway::new(
                settings.razorpay.api_base_url.clone(),
                key_id,
                key_secret,
            ))
        } else {
            tracing::warn!("Razorpay enabled but missing credentials");
            Arc::new(payments::DisabledGateway)
        }
    } else {
        tracing::info!("Razorpay payment processing disabled");
        Arc::new(payments::DisabledGateway)
    };

    // Certificate renderer, if an endpoint is configured
    let renderer: Arc<dyn samiti::service::CertificateRenderer> =
        match settings.storage.renderer_url.clone() {
            Some(url) => Arc::new(HttpCertificateRenderer::new(url)),
            None => {
                tracing::warn!("No certificate renderer configured; issuance will be skipped");
                Arc::new(DisabledCertificateRenderer)
            }
        };

    // Document and certificate storage
    let store: Arc<dyn samiti::storage::ObjectStore> = Arc::new(LocalObjectStore::new(
        &settings.storage.root_dir,
        &settings.storage.public_base_url,
    ));

    // Notification dispatcher
    let dispatcher = Arc::new(notifications::NotificationDispatcher::new());
    if let Some(mailer) = notifications::EmailNotifier::new(&settings.smtp) {
        dispatcher.register(Arc::new(mailer)).await;
    } else {
        tracing::info!("Email notifications disabled");
    }

    // Create service context
    let service_context = Arc::new(ServiceContext::new(
        member_repo,
        payment_repo,
        donation_repo,
        certificate_repo,
        gateway,
        renderer,
        store.clone(),
        dispatcher,
        auth_service,
        settings.membership.clone(),
        db_pool.clone(),
    ));

    // Create the app
    let app = api::create_app(service_context, store, Arc::new(settings.clone()));

    let listener = tokio::net::TcpListener::bind(format!(
        "{}:{}",
        settings.server.host, settings.server.port
    ))
    .await?;

    tracing::info!(
        "Server listening on http://{}:{}",
        settings.server.host,
        settings.server.port
    );

    axum::serve(listener, app).await?;

    Ok(())
}
