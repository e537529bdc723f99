use boda_shared::models::{now_str, Boda, Plantilla, PlantillaSlug};
use boda_shared::whatsapp::WhatsappClient;
use chrono::NaiveDate;
use mockito::Matcher;
use serde_json::json;

use super::*;
use crate::error::ClientError;
use crate::messaging::{Composer, MessageBody, Recipients};
use crate::whatsapp::SessionState;

fn boda() -> Boda {
    Boda {
        id: BODA_ID.to_string(),
        nombre: "Ana y Luis".to_string(),
        fecha: NaiveDate::from_ymd_opt(2027, 6, 12),
        ubicacion: None,
        telefono_contacto: None,
        detalles: None,
        created_at: now_str(),
        updated_at: now_str(),
    }
}

fn composer(whatsapp_url: &str, api_url: &str) -> Composer {
    let services = Services::new(signed_in_client(api_url, "tok"));
    Composer::new(WhatsappClient::new(whatsapp_url), services.guests, boda(), "34")
}

#[tokio::test]
async fn test_send_requires_connected_session() {
    let mut whatsapp = mockito::Server::new_async().await;
    let mock = whatsapp.mock("POST", "/send").expect(0).create_async().await;

    let composer = composer(&whatsapp.url(), "http://127.0.0.1:9");
    let err = composer
        .send(
            &SessionState::NeedsQr { qr: None },
            &MessageBody::Direct("Hola".to_string()),
            &Recipients::Guests(vec![guest("g-1", "Ana", "600000001")]),
            &[],
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::NotConnected));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_mode_without_valid_numbers_aborts() {
    let mut whatsapp = mockito::Server::new_async().await;
    let broadcast = whatsapp
        .mock("POST", "/broadcast")
        .expect(0)
        .create_async()
        .await;
    let send = whatsapp.mock("POST", "/send").expect(0).create_async().await;

    let everyone = vec![guest("g-1", "Ana", "abc"), guest("g-2", "Luis", "12")];
    let composer = composer(&whatsapp.url(), "http://127.0.0.1:9");
    let err = composer
        .send(
            &SessionState::Connected,
            &MessageBody::Direct("Hola".to_string()),
            &Recipients::Lists(vec![lista("l-1", "Familia", &["g-1", "g-2"])]),
            &everyone,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)));
    broadcast.assert_async().await;
    send.assert_async().await;
}

#[tokio::test]
async fn test_direct_message_reports_each_recipient() {
    let mut whatsapp = mockito::Server::new_async().await;
    let ok = whatsapp
        .mock("POST", "/send")
        .match_body(Matcher::PartialJson(json!({ "telefono": "34600000001", "mensaje": "Hola" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ok_json())
        .expect(1)
        .create_async()
        .await;

    let composer = composer(&whatsapp.url(), "http://127.0.0.1:9");
    let outcomes = composer
        .send(
            &SessionState::Connected,
            &MessageBody::Direct("Hola".to_string()),
            &Recipients::Guests(vec![
                guest("g-1", "Ana", "+34 600 000 001"),
                guest("g-2", "Roto", "abc123"),
                guest("g-1", "Ana", "+34 600 000 001"),
            ]),
            &[],
        )
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 2);
    let ana = outcomes.iter().find(|o| o.invitado_id == "g-1").unwrap();
    assert!(ana.ok);
    assert_eq!(ana.telefono, "34600000001");
    let roto = outcomes.iter().find(|o| o.invitado_id == "g-2").unwrap();
    assert!(!roto.ok);
    assert_eq!(roto.telefono, "abc123");
    ok.assert_async().await;
}

#[tokio::test]
async fn test_direct_message_to_lists_is_one_broadcast() {
    let mut whatsapp = mockito::Server::new_async().await;
    let broadcast = whatsapp
        .mock("POST", "/broadcast")
        .match_body(Matcher::Json(json!({
            "telefonos": ["34600000001", "34600000002"],
            "mensaje": "Nos casamos"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ok_json())
        .expect(1)
        .create_async()
        .await;

    let everyone = vec![
        guest("g-1", "Ana", "600000001"),
        guest("g-2", "Luis", "600000002"),
        guest("g-3", "Roto", "x"),
    ];
    let composer = composer(&whatsapp.url(), "http://127.0.0.1:9");
    let outcomes = composer
        .send(
            &SessionState::Connected,
            &MessageBody::Direct("Nos casamos".to_string()),
            &Recipients::Lists(vec![
                lista("l-1", "Familia", &["g-1", "g-3"]),
                lista("l-2", "Amigos", &["g-2", "g-1"]),
            ]),
            &everyone,
        )
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes.iter().filter(|o| o.ok).count(), 2);
    broadcast.assert_async().await;
}

#[tokio::test]
async fn test_template_is_rendered_with_magic_link() {
    let mut api = mockito::Server::new_async().await;
    let enlace = api
        .mock("GET", "/guests/g-1/enlace")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"enlace": "https://bodas.test/acceso?token=t1", "token": "t1"}"#)
        .expect(1)
        .create_async()
        .await;

    let mut whatsapp = mockito::Server::new_async().await;
    let send = whatsapp
        .mock("POST", "/send")
        .match_body(Matcher::Json(json!({
            "telefono": "34600000001",
            "mensaje": "Hola Ana, boda Ana y Luis el 12/06/2027: https://bodas.test/acceso?token=t1"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ok_json())
        .expect(1)
        .create_async()
        .await;

    let plantilla = Plantilla {
        id: "pl-1".to_string(),
        boda_id: BODA_ID.to_string(),
        usuario_id: "u-1".to_string(),
        nombre: "Invitación".to_string(),
        contenido: "Hola {nombre}, boda {boda} el {fecha}: {enlace}".to_string(),
        slug: PlantillaSlug::Custom,
        created_at: now_str(),
        updated_at: now_str(),
    };

    let composer = composer(&whatsapp.url(), &api.url());
    let outcomes = composer
        .send(
            &SessionState::Connected,
            &MessageBody::Template(plantilla),
            &Recipients::Guests(vec![guest("g-1", "Ana", "600000001")]),
            &[],
        )
        .await
        .unwrap();

    assert!(outcomes[0].ok);
    enlace.assert_async().await;
    send.assert_async().await;
}
