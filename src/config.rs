use std::time::Duration;

/// Connection settings for the Odoo instance, injected into the ERP client
/// at construction time. Nothing in the client reads the environment.
#[derive(Debug, Clone)]
pub struct OdooConfig {
    pub base_url: String,
    pub database: String,
    pub username: String,
    pub password: String,
    /// Bound on every ERP round trip.
    pub timeout: Duration,
    /// When set, authenticated sessions are cached per (base_url, username)
    /// for this long. Unset preserves the authenticate-per-operation
    /// behavior of the original integration.
    pub session_ttl: Option<Duration>,
}

#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// Pre-shared key compared against the `x-api-key` request header.
    pub webhook_api_key: String,
    pub odoo: OdooConfig,
    /// Firebase service-account JSON; push notifications are disabled when
    /// absent.
    pub firebase_service_account: Option<String>,
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let webhook_api_key =
        std::env::var("WEBHOOK_API_KEY").unwrap_or_else(|_| "CHANGE_ME_WEBHOOK_KEY".into());

    if webhook_api_key == "CHANGE_ME_WEBHOOK_KEY" {
        let env_mode = std::env::var("APP_ENV")
            .or_else(|_| std::env::var("RUST_ENV"))
            .unwrap_or_default();
        if env_mode == "production" {
            anyhow::bail!(
                "WEBHOOK_API_KEY is still the insecure placeholder. \
                 Set a real pre-shared key before running in production."
            );
        }
        eprintln!("⚠️  WEBHOOK_API_KEY is not set — using insecure placeholder.");
    }

    let session_ttl = std::env::var("ODOO_SESSION_TTL_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs);

    Ok(Config {
        port: std::env::var("WEBHOOK_PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .unwrap_or(8080),
        database_url: std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/marketplace".into()),
        webhook_api_key,
        odoo: OdooConfig {
            base_url: std::env::var("ODOO_URL")
                .unwrap_or_else(|_| "http://localhost:8069".into()),
            database: std::env::var("ODOO_DB").unwrap_or_else(|_| "odoo".into()),
            username: std::env::var("ODOO_USERNAME").unwrap_or_else(|_| "admin".into()),
            password: std::env::var("ODOO_PASSWORD").unwrap_or_else(|_| "admin".into()),
            timeout: Duration::from_secs(
                std::env::var("ODOO_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            ),
            session_ttl,
        },
        firebase_service_account: std::env::var("FIREBASE_SERVICE_ACCOUNT").ok(),
    })
}
