//! WhatsApp session as seen from the dashboard. The micro-service owns the
//! actual connection; this only mirrors its status.

use boda_shared::whatsapp::{StatusResponse, WhatsappClient};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::ClientConfig;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    /// Waiting for the phone to scan `qr`, a data URL image.
    NeedsQr { qr: Option<String> },
    Connected,
    Disconnected,
    LoggedOut,
    /// The service answered with an error state of its own.
    Error(String),
    /// The service itself could not be reached.
    ErrorServicio(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    Poll,
    Halt,
}

impl SessionState {
    pub fn from_status(status: &StatusResponse) -> Self {
        match status.estado.trim().to_ascii_uppercase().as_str() {
            "CONNECTING" | "STARTING" | "INITIALIZING" => SessionState::Connecting,
            "NEEDS_QR" | "QR" => SessionState::NeedsQr {
                qr: status.qr.clone(),
            },
            "CONNECTED" | "READY" => SessionState::Connected,
            "DISCONNECTED" => SessionState::Disconnected,
            "LOGGED_OUT" => SessionState::LoggedOut,
            "ERROR" => SessionState::Error("The WhatsApp service reported an error".to_string()),
            "ERROR_SERVICIO" => SessionState::ErrorServicio(
                "The WhatsApp service is not available".to_string(),
            ),
            other => SessionState::Error(format!("Unknown WhatsApp state {}", other)),
        }
    }

    /// Only transient states are polled again.
    pub fn next_action(&self) -> NextAction {
        match self {
            SessionState::Connecting | SessionState::NeedsQr { .. } => NextAction::Poll,
            _ => NextAction::Halt,
        }
    }

    pub fn can_send(&self) -> bool {
        matches!(self, SessionState::Connected)
    }
}

async fn fetch_state(client: &WhatsappClient) -> SessionState {
    match client.status().await {
        Ok(status) => SessionState::from_status(&status),
        Err(e) => {
            warn!("WhatsApp status unavailable: {}", e);
            SessionState::ErrorServicio(e.to_string())
        }
    }
}

/// Polls the status endpoint in a background task while the session is in a
/// transient state and publishes every observation.
pub struct StatusPoller {
    client: WhatsappClient,
    interval: Duration,
    tx: Arc<watch::Sender<SessionState>>,
    task: Option<JoinHandle<()>>,
}

impl StatusPoller {
    pub fn new(client: WhatsappClient, interval: Duration) -> Self {
        let (tx, _) = watch::channel(SessionState::Connecting);
        Self {
            client,
            interval,
            tx: Arc::new(tx),
            task: None,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            WhatsappClient::new(&config.whatsapp_base_url),
            config.poll_interval,
        )
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Starts polling, replacing any running task.
    pub fn start(&mut self) {
        self.stop();

        let client = self.client.clone();
        let interval = self.interval;
        let tx = Arc::clone(&self.tx);
        self.task = Some(tokio::spawn(async move {
            loop {
                let state = fetch_state(&client).await;
                let action = state.next_action();
                debug!("WhatsApp state: {:?}", state);
                tx.send_replace(state);
                if action == NextAction::Halt {
                    break;
                }
                tokio::time::sleep(interval).await;
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Back to `Connecting` and poll again, e.g. after `ErrorServicio`.
    pub fn retry(&mut self) {
        info!("Retrying WhatsApp status polling");
        self.tx.send_replace(SessionState::Connecting);
        self.start();
    }

    /// Asks the service to open a session, then follows it until it settles.
    pub async fn start_session(&mut self) -> Result<()> {
        self.client.start_session().await?;
        self.retry();
        Ok(())
    }

    pub async fn logout(&mut self) -> Result<()> {
        self.stop();
        self.client.logout().await?;
        self.tx.send_replace(SessionState::LoggedOut);
        Ok(())
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(estado: &str, qr: Option<&str>) -> StatusResponse {
        StatusResponse {
            estado: estado.to_string(),
            qr: qr.map(str::to_string),
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            SessionState::from_status(&status("NEEDS_QR", Some("data:image/png;base64,AA"))),
            SessionState::NeedsQr {
                qr: Some("data:image/png;base64,AA".to_string())
            }
        );
        assert_eq!(
            SessionState::from_status(&status("connected", None)),
            SessionState::Connected
        );
        assert!(matches!(
            SessionState::from_status(&status("error_servicio", None)),
            SessionState::ErrorServicio(_)
        ));
        assert!(matches!(
            SessionState::from_status(&status("WHATEVER", None)),
            SessionState::Error(_)
        ));
    }

    #[test]
    fn test_only_transient_states_poll() {
        assert_eq!(SessionState::Connecting.next_action(), NextAction::Poll);
        assert_eq!(SessionState::NeedsQr { qr: None }.next_action(), NextAction::Poll);
        for settled in [
            SessionState::Connected,
            SessionState::Disconnected,
            SessionState::LoggedOut,
            SessionState::Error("x".to_string()),
            SessionState::ErrorServicio("x".to_string()),
        ] {
            assert_eq!(settled.next_action(), NextAction::Halt);
        }
        assert!(SessionState::Connected.can_send());
        assert!(!SessionState::NeedsQr { qr: None }.can_send());
    }

    #[tokio::test]
    async fn test_unreachable_service_is_error_servicio() {
        let mut poller = StatusPoller::new(
            WhatsappClient::new("http://127.0.0.1:9"),
            Duration::from_millis(10),
        );
        let mut rx = poller.subscribe();
        poller.start();

        rx.changed().await.unwrap();
        assert!(matches!(*rx.borrow(), SessionState::ErrorServicio(_)));
    }
}
