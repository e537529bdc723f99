use boda_api_service::config::Config;
use boda_api_service::routes::{create_router_with_store, seed_admin};
use boda_shared::models::{now_str, Invitado, ListaDifusion};
use boda_shared::test_utils::mock_store::MockStore;
use boda_shared::test_utils::test_logging::init_test_logging;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::http::ApiClient;
use crate::services::Services;
use crate::session::{IdentityProvider, Session};

mod http_test;
mod messaging_test;

pub(crate) const BODA_ID: &str = "boda-1";
pub(crate) const ADMIN_EMAIL: &str = "admin@bodas.test";
pub(crate) const ADMIN_PASSWORD: &str = "s3creta";

/// Client against `base_url` with an empty in-memory session.
pub(crate) fn client(base_url: &str) -> ApiClient {
    init_test_logging();
    ApiClient::new(base_url, IdentityProvider::in_memory())
}

/// Client that already holds `token`.
pub(crate) fn signed_in_client(base_url: &str, token: &str) -> ApiClient {
    let api = client(base_url);
    api.identity()
        .set(Session {
            token: token.to_string(),
            usuario: None,
        })
        .unwrap();
    api
}

/// Starts the real API over an in-memory store on an ephemeral port, with an
/// admin account seeded, and returns its base URL.
pub(crate) async fn spawn_api(whatsapp_url: &str) -> String {
    init_test_logging();
    let mut config = Config::for_tests(whatsapp_url);
    config.admin_email = Some(ADMIN_EMAIL.to_string());
    config.admin_password = Some(ADMIN_PASSWORD.to_string());

    let store = Arc::new(MockStore::new());
    seed_admin(&*store, &config).await;
    let app = create_router_with_store(store, config, "");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Logged-in admin services against a freshly spawned API.
pub(crate) async fn admin_services(whatsapp_url: &str) -> (Services, String) {
    let base_url = spawn_api(whatsapp_url).await;
    let services = Services::new(client(&base_url));
    services.auth.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
    (services, base_url)
}

pub(crate) fn guest(id: &str, nombre: &str, telefono: &str) -> Invitado {
    let mut invitado = Invitado::new(BODA_ID, nombre, telefono);
    invitado.id = id.to_string();
    invitado
}

pub(crate) fn guest_json(id: &str, nombre: &str, telefono: &str) -> Value {
    serde_json::to_value(guest(id, nombre, telefono)).unwrap()
}

pub(crate) fn lista(id: &str, nombre: &str, invitados: &[&str]) -> ListaDifusion {
    ListaDifusion {
        id: id.to_string(),
        boda_id: BODA_ID.to_string(),
        nombre: nombre.to_string(),
        invitados: invitados.iter().map(|s| s.to_string()).collect(),
        version: 0,
        created_at: now_str(),
        updated_at: now_str(),
    }
}

pub(crate) fn json_body(value: Value) -> String {
    value.to_string()
}

pub(crate) fn ok_json() -> String {
    json_body(json!({ "ok": true }))
}
