use boda_shared::whatsapp::WhatsappClient;
use std::sync::Arc;

use crate::config::Config;

/// Shared handler state: the store, settings and the WhatsApp client.
pub struct AppState<S> {
    pub store: Arc<S>,
    pub config: Arc<Config>,
    pub whatsapp: WhatsappClient,
}

impl<S> AppState<S> {
    pub fn new(store: Arc<S>, config: Config) -> Self {
        let whatsapp = WhatsappClient::new(&config.whatsapp_service_url);
        Self {
            store,
            config: Arc::new(config),
            whatsapp,
        }
    }
}

// Manual impl: `S` itself does not need to be Clone.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            config: self.config.clone(),
            whatsapp: self.whatsapp.clone(),
        }
    }
}
