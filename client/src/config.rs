use log::{info, warn};
use std::{env, path::PathBuf, time::Duration};

use boda_shared::phone::DEFAULT_COUNTRY_CODE;

/// Default delay between WhatsApp status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(7);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub whatsapp_base_url: String,
    pub default_country_code: String,
    pub poll_interval: Duration,
    /// Where the bearer token and cached user are persisted between runs.
    pub session_path: PathBuf,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let poll_secs = load("WHATSAPP_POLL_SECONDS", "7");
        let poll_interval = match poll_secs.parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                warn!("Invalid WHATSAPP_POLL_SECONDS '{poll_secs}', using 7");
                DEFAULT_POLL_INTERVAL
            }
        };

        Self {
            api_base_url: load("BODA_API_URL", "http://localhost:3000"),
            whatsapp_base_url: load("WHATSAPP_SERVICE_URL", "http://localhost:4000"),
            default_country_code: load("DEFAULT_COUNTRY_CODE", DEFAULT_COUNTRY_CODE),
            poll_interval,
            session_path: PathBuf::from(load("BODA_SESSION_PATH", ".boda-session.json")),
        }
    }
}

fn load(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}
