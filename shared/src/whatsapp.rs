use log::{error, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WhatsappError {
    #[error("WhatsApp service unreachable: {0}")]
    Unreachable(String),

    #[error("WhatsApp service returned {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Failed to parse WhatsApp service response: {0}")]
    Decode(String),
}

/// Body of `GET /status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub estado: String,
    /// QR image as a data URL, present while the session waits for a scan.
    #[serde(default)]
    pub qr: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendRequest<'a> {
    pub telefono: &'a str,
    pub mensaje: &'a str,
}

/// Who a broadcast goes to: a list the service knows by name, or explicit numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum BroadcastTarget {
    Lista(String),
    Telefonos(Vec<String>),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BroadcastRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    nombre_lista: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    telefonos: Option<&'a [String]>,
    mensaje: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP client for the external WhatsApp micro-service. The service owns the
/// session lifecycle; this only speaks its status/send/broadcast contract.
#[derive(Debug, Clone)]
pub struct WhatsappClient {
    base_url: String,
    http: Client,
}

impl WhatsappClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: &str, http: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn from_env() -> Self {
        let base_url = std::env::var("WHATSAPP_SERVICE_URL")
            .unwrap_or_else(|_| "http://localhost:4000".to_string());
        Self::new(&base_url)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn status(&self) -> Result<StatusResponse, WhatsappError> {
        let response = self
            .http
            .get(self.url("/status"))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                error!("Failed to reach WhatsApp status endpoint: {}", e);
                WhatsappError::Unreachable(e.to_string())
            })?;

        parse_response(response).await
    }

    pub async fn start_session(&self) -> Result<serde_json::Value, WhatsappError> {
        self.post("/start-session", &serde_json::json!({})).await
    }

    pub async fn logout(&self) -> Result<serde_json::Value, WhatsappError> {
        self.post("/logout", &serde_json::json!({})).await
    }

    /// Sends a single message. `telefono` must already be normalized.
    pub async fn send(
        &self,
        telefono: &str,
        mensaje: &str,
    ) -> Result<serde_json::Value, WhatsappError> {
        info!("Sending WhatsApp message to {}", telefono);
        self.post("/send", &SendRequest { telefono, mensaje }).await
    }

    pub async fn broadcast(
        &self,
        target: &BroadcastTarget,
        mensaje: &str,
    ) -> Result<serde_json::Value, WhatsappError> {
        let body = match target {
            BroadcastTarget::Lista(nombre) => BroadcastRequest {
                nombre_lista: Some(nombre.as_str()),
                telefonos: None,
                mensaje,
            },
            BroadcastTarget::Telefonos(telefonos) => BroadcastRequest {
                nombre_lista: None,
                telefonos: Some(telefonos.as_slice()),
                mensaje,
            },
        };

        info!("Sending WhatsApp broadcast: {:?}", target);
        self.post("/broadcast", &body).await
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<serde_json::Value, WhatsappError> {
        let response = self
            .http
            .post(self.url(path))
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to reach WhatsApp service at {}: {}", path, e);
                WhatsappError::Unreachable(e.to_string())
            })?;

        parse_response(response).await
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, WhatsappError> {
    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&error_text)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .unwrap_or(error_text);
        error!(
            "WhatsApp service returned error status {}: {}",
            status, message
        );
        return Err(WhatsappError::Rejected {
            status: status.as_u16(),
            message,
        });
    }

    response.json().await.map_err(|e| {
        error!("Failed to parse WhatsApp service response: {}", e);
        WhatsappError::Decode(e.to_string())
    })
}
