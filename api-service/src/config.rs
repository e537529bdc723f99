use log::{info, warn};
use std::{env, fmt::Display, str::FromStr};

use boda_shared::phone::DEFAULT_COUNTRY_CODE;

/// Runtime settings, read once at start-up.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Lambda deployments serve under `/Prod` unless this is set.
    pub remove_base_path: bool,
    pub whatsapp_service_url: String,
    /// Base of the guest panel; magic links are `{panel_base_url}/acceso?token=...`.
    pub panel_base_url: String,
    pub default_country_code: String,
    pub user_token_ttl_hours: i64,
    pub guest_token_ttl_hours: i64,
    /// Use the in-memory store instead of DynamoDB (`STORE=memory`).
    pub use_memory_store: bool,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: try_load("PORT", "3000"),
            remove_base_path: try_load("REMOVE_BASE_PATH", "false"),
            whatsapp_service_url: load("WHATSAPP_SERVICE_URL", "http://localhost:4000"),
            panel_base_url: load("PANEL_BASE_URL", "http://localhost:5173"),
            default_country_code: load("DEFAULT_COUNTRY_CODE", DEFAULT_COUNTRY_CODE),
            user_token_ttl_hours: try_load("USER_TOKEN_TTL_HOURS", "168"),
            guest_token_ttl_hours: try_load("GUEST_TOKEN_TTL_HOURS", "720"),
            use_memory_store: load("STORE", "dynamodb").eq_ignore_ascii_case("memory"),
            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
        }
    }

    /// Settings for router tests: in-memory store and the given WhatsApp endpoint.
    pub fn for_tests(whatsapp_service_url: &str) -> Self {
        Self {
            port: 0,
            remove_base_path: true,
            whatsapp_service_url: whatsapp_service_url.to_string(),
            panel_base_url: "https://bodas.test".to_string(),
            default_country_code: DEFAULT_COUNTRY_CODE.to_string(),
            user_token_ttl_hours: 1,
            guest_token_ttl_hours: 1,
            use_memory_store: true,
            admin_email: None,
            admin_password: None,
        }
    }

    pub fn route_prefix(&self) -> &'static str {
        if self.remove_base_path {
            ""
        } else {
            "/Prod"
        }
    }
}

fn load(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    let raw = load(key, default);
    match raw.parse() {
        Ok(value) => value,
        Err(e) => {
            warn!("Invalid {key} value '{raw}': {e}, using default: {default}");
            match default.parse() {
                Ok(value) => value,
                Err(_) => unreachable!("default for {key} must parse"),
            }
        }
    }
}
