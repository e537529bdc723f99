use axum::Router;
use boda_shared::auth::Identity;
use boda_shared::models::{now_str, Boda, Invitado, ListaDifusion, Pregunta, Rol, SubPregunta};
use boda_shared::store::{BodaStore, InvitadoStore, ListaStore, PreguntaStore};
use boda_shared::test_utils::mock_store::MockStore;
use boda_shared::test_utils::test_logging::init_test_logging;
use chrono::NaiveDate;
use std::sync::Arc;

use crate::config::Config;
use crate::routes::create_router_with_store;

mod guest_handlers_test;
mod import_handlers_test;
mod panel_handlers_test;

pub(crate) const BODA_ID: &str = "boda-test";

/// Router over a fresh in-memory store. WhatsApp calls go to `whatsapp_url`.
pub(crate) fn create_test_app_with_whatsapp(whatsapp_url: &str) -> (Router, Arc<MockStore>) {
    init_test_logging();
    let store = Arc::new(MockStore::new());
    let app = create_router_with_store(store.clone(), Config::for_tests(whatsapp_url), "");
    (app, store)
}

/// Router for tests that never reach the WhatsApp service.
pub(crate) fn create_test_app() -> (Router, Arc<MockStore>) {
    create_test_app_with_whatsapp("http://127.0.0.1:9")
}

pub(crate) fn admin() -> Identity {
    Identity::new("admin-1", Rol::Admin, None)
}

pub(crate) fn novio() -> Identity {
    Identity::new("novio-1", Rol::Novio, Some(BODA_ID))
}

pub(crate) fn guest_identity(invitado: &Invitado) -> Identity {
    Identity::new(&invitado.id, Rol::Invitado, Some(&invitado.boda_id))
}

pub(crate) async fn seed_boda(store: &MockStore) -> Boda {
    let boda = Boda {
        id: BODA_ID.to_string(),
        nombre: "Ana y Luis".to_string(),
        fecha: NaiveDate::from_ymd_opt(2027, 6, 12),
        ubicacion: Some("Sevilla".to_string()),
        telefono_contacto: None,
        detalles: None,
        created_at: now_str(),
        updated_at: now_str(),
    };
    store.create_boda(boda).await.unwrap()
}

pub(crate) async fn seed_guest(store: &MockStore, nombre: &str, telefono: &str) -> Invitado {
    store
        .create_invitado(Invitado::new(BODA_ID, nombre, telefono))
        .await
        .unwrap()
}

pub(crate) fn attendance_question() -> Pregunta {
    Pregunta {
        id: uuid::Uuid::new_v4().to_string(),
        boda_id: BODA_ID.to_string(),
        pregunta: "¿Asistirás?".to_string(),
        opciones: vec!["Sí".to_string(), "No".to_string()],
        obligatoria: true,
        es_confirmacion: true,
        subpregunta: Some(SubPregunta {
            pregunta: "¿Necesitas autobús?".to_string(),
            opciones: vec!["Ida".to_string(), "Ida y vuelta".to_string()],
            condicion: "si".to_string(),
        }),
        version: 0,
        created_at: now_str(),
        updated_at: now_str(),
    }
}

pub(crate) async fn seed_question(store: &MockStore, pregunta: Pregunta) -> Pregunta {
    store.create_pregunta(pregunta).await.unwrap()
}

pub(crate) async fn seed_list(store: &MockStore, nombre: &str, members: &[&Invitado]) -> ListaDifusion {
    let lista = ListaDifusion {
        id: uuid::Uuid::new_v4().to_string(),
        boda_id: BODA_ID.to_string(),
        nombre: nombre.to_string(),
        invitados: members.iter().map(|i| i.id.clone()).collect(),
        version: 0,
        created_at: now_str(),
        updated_at: now_str(),
    };
    let lista = store.create_lista(lista).await.unwrap();
    for member in members {
        let mut invitado = store.get_invitado(&member.id).await.unwrap();
        invitado.listas.push(lista.id.clone());
        store.update_invitado(invitado).await.unwrap();
    }
    lista
}
