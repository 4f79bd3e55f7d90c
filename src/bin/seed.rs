use chrono::{Duration, Utc};
use clap::Parser;
use fake::faker::address::en::CityName;
use fake::faker::company::en::{CompanyName, Industry};
use fake::faker::name::en::Name;
use fake::Fake;
use sqlx::sqlite::SqlitePoolOptions;
use uuid::Uuid;

use samiti::{
    auth::AuthService,
    domain::{FeeBreakdown, Payment, PaymentStatus, PaymentType, RegistrationRequest},
    repository::{
        MemberRepository, PaymentRepository, SqliteMemberRepository, SqlitePaymentRepository,
    },
    service::MEMBERSHIP_TERM_DAYS,
};

#[derive(Parser)]
#[command(about = "Populate the database with sample members and payments")]
struct Args {
    /// Database URL (falls back to DATABASE_URL, then sqlite:samiti.db)
    #[arg(long)]
    database_url: Option<String>,

    /// Number of pending members to generate
    #[arg(long, default_value_t = 4)]
    pending: usize,

    /// Number of approved members to generate
    #[arg(long, default_value_t = 6)]
    approved: usize,

    /// Admin email to create
    #[arg(long, default_value = "admin@samiti.local")]
    admin_email: String,

    /// Admin password to create
    #[arg(long, default_value = "admin123")]
    admin_password: String,
}

fn fake_registration(n: usize) -> RegistrationRequest {
    let company: String = CompanyName().fake();
    RegistrationRequest {
        company_name: company.clone(),
        contact_person: Name().fake(),
        mobile: format!("98{:08}", 10000000 + n * 37),
        alternate_phone: None,
        email: format!("member{}@example.com", n),
        address: format!("{} Market Road", 10 + n),
        city: CityName().fake(),
        taluk: CityName().fake(),
        district: CityName().fake(),
        state: "Karnataka".to_string(),
        pin_code: format!("5600{:02}", n % 100),
        gstin: None,
        category: Industry().fake(),
        license_url: format!("http://localhost:8080/storage/documents/license-{}.pdf", n),
        id_proof_url: format!("http://localhost:8080/storage/documents/id-{}.pdf", n),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    println!("Starting database seeding...");

    let database_url = args
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite:samiti.db".to_string());

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    println!("Running migrations...");
    sqlx::migrate!("./migrations").run(&db_pool).await?;

    let member_repo = SqliteMemberRepository::new(db_pool.clone());
    let payment_repo = SqlitePaymentRepository::new(db_pool.clone());
    let auth_service = AuthService::new(db_pool.clone(), 5);

    println!("Creating admin user...");
    auth_service
        .create_admin(&args.admin_email, &args.admin_password)
        .await?;
    println!("  Created {} / {}", args.admin_email, args.admin_password);

    println!("Creating {} pending members...", args.pending);
    for n in 0..args.pending {
        member_repo.create(fake_registration(n)).await?;
    }

    println!("Creating {} approved members...", args.approved);
    for n in 0..args.approved {
        let member = member_repo.create(fake_registration(1000 + n)).await?;

        // Registration payment, completed
        let now = Utc::now();
        let quote = FeeBreakdown::quote(500.0, 0.0);
        let payment = payment_repo
            .create(Payment {
                id: Uuid::new_v4(),
                member_id: Some(member.id),
                amount: quote.total,
                membership_fee: quote.membership_fee,
                gateway_charges: quote.gateway_charges,
                donation_amount: quote.donation_amount,
                payment_type: PaymentType::Registration,
                status: PaymentStatus::Pending,
                gateway_order_id: None,
                gateway_payment_id: None,
                created_at: now,
                updated_at: now,
            })
            .await?;
        let order_id = format!("order_seed_{}", n);
        payment_repo.attach_order_id(payment.id, &order_id).await?;
        payment_repo
            .complete(payment.id, &order_id, &format!("pay_seed_{}", n))
            .await?;

        let sequence = member_repo.next_membership_sequence().await?;
        let membership_id = format!("KMDA {:04}", sequence);

        // Make one of them already expired
        let expiry = if n == 0 {
            Utc::now() - Duration::days(30)
        } else {
            Utc::now() + Duration::days(MEMBERSHIP_TERM_DAYS)
        };

        member_repo
            .approve(member.id, &membership_id, expiry, Utc::now())
            .await?;
    }

    println!("Seeding complete.");

    Ok(())
}
