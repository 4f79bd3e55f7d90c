use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub razorpay: RazorpayConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub membership: MembershipConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub session_duration_hours: i64,
    /// Upper bound on the admin-privilege lookup. On timeout the caller
    /// is treated as not privileged.
    pub admin_check_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RazorpayConfig {
    pub key_id: Option<String>,
    pub key_secret: Option<String>,
    #[serde(default = "default_razorpay_api")]
    pub api_base_url: String,
    #[serde(default)]
    pub enabled: bool,
}

fn default_razorpay_api() -> String {
    "https://api.razorpay.com/v1".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SmtpConfig {
    pub host: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_address: Option<String>,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub root_dir: String,
    pub public_base_url: String,
    /// Optional external render service for certificate PDFs.
    pub renderer_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MembershipConfig {
    pub fee: f64,
    pub renewal_fee: f64,
    pub currency: String,
    /// Prefix for minted membership ids, e.g. "KMDA 0042".
    pub id_prefix: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.base_url", "http://localhost:8080")?
            .set_default("database.max_connections", 10)?
            .set_default("auth.session_duration_hours", 24)?
            .set_default("auth.admin_check_timeout_secs", 5)?
            .set_default("razorpay.enabled", false)?
            .set_default("smtp.enabled", false)?
            .set_default("storage.root_dir", "storage")?
            .set_default("storage.public_base_url", "http://localhost:8080/storage")?
            .set_default("membership.fee", 500.0)?
            .set_default("membership.renewal_fee", 500.0)?
            .set_default("membership.currency", "INR")?
            .set_default("membership.id_prefix", "KMDA")?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with SAMITI__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("SAMITI").separator("__"))

            .build()?;

        config.try_deserialize()
    }
}

impl Default for MembershipConfig {
    fn default() -> Self {
        Self {
            fee: 500.0,
            renewal_fee: 500.0,
            currency: "INR".to_string(),
            id_prefix: "KMDA".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: "storage".to_string(),
            public_base_url: "http://localhost:8080/storage".to_string(),
            renderer_url: None,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                base_url: "http://localhost:8080".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://samiti.db".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                session_duration_hours: 24,
                admin_check_timeout_secs: 5,
            },
            razorpay: RazorpayConfig::default(),
            smtp: SmtpConfig::default(),
            storage: StorageConfig::default(),
            membership: MembershipConfig::default(),
        }
    }
}
