use boda_shared::models::{now_str, Pregunta};
use mockito::Matcher;
use serde_json::json;

use super::*;
use crate::error::ClientError;
use crate::lists::ListManager;
use crate::questions::{CreateQuestionInput, QuestionInput};
use crate::roster::GuestRoster;

#[tokio::test]
async fn test_bearer_token_is_attached_when_present() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/bodas")
        .match_header("authorization", "Bearer tok-123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"bodas": []}"#)
        .expect(1)
        .create_async()
        .await;

    let services = Services::new(signed_in_client(&server.url(), "tok-123"));
    let bodas = services.bodas.list().await.unwrap();

    assert!(bodas.is_empty());
    assert_eq!(bodas.meta.total, 0);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_no_authorization_header_without_session() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/login")
        .match_header("authorization", Matcher::Missing)
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "Invalid email or password"}"#)
        .create_async()
        .await;

    let services = Services::new(client(&server.url()));
    let err = services.auth.login("a@b.c", "mal").await.unwrap_err();

    match err {
        ClientError::Http { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid email or password");
        }
        other => panic!("expected http error, got {:?}", other),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_message_falls_back_to_status_text() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/guests/g-1")
        .with_status(404)
        .with_body("not json")
        .create_async()
        .await;
    server
        .mock("GET", "/guests/g-2")
        .with_status(409)
        .with_body(r#"{"error": "Versión desactualizada"}"#)
        .create_async()
        .await;

    let services = Services::new(signed_in_client(&server.url(), "tok"));

    let err = services.guests.get("g-1").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("Not Found"));

    let err = services.guests.get("g-2").await.unwrap_err();
    assert!(err.to_string().contains("Versión desactualizada"));
}

#[tokio::test]
async fn test_every_listing_shape_is_normalized() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/guests/boda/boda-1")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "2".into()),
            Matcher::UrlEncoded("limit".into(), "1".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json_body(json!({
            "invitados": [guest_json("g-2", "Luis", "34600000002")],
            "total": 3, "pagina": 2, "limite": 1, "totalPaginas": 3
        })))
        .create_async()
        .await;
    server
        .mock("GET", "/lists/boda/boda-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json_body(json!({ "listas": [lista("l-1", "Familia", &["g-1"])] })))
        .create_async()
        .await;
    server
        .mock("GET", "/plantillas/boda/boda-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"ok": true, "plantillas": []}"#)
        .create_async()
        .await;

    let services = Services::new(signed_in_client(&server.url(), "tok"));

    let page = services.guests.page(BODA_ID, 2, 1, None).await.unwrap();
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.meta.total, 3);
    assert_eq!(page.meta.page, 2);
    assert_eq!(page.meta.total_pages, 3);

    let listas = services.lists.list(BODA_ID).await.unwrap();
    assert_eq!(listas.meta.total, 1);
    assert_eq!(listas.data[0].nombre, "Familia");

    let plantillas = services.templates.list(BODA_ID).await.unwrap();
    assert!(plantillas.is_empty());
}

#[tokio::test]
async fn test_invalid_question_never_reaches_the_server() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/preguntas")
        .expect(0)
        .create_async()
        .await;

    let services = Services::new(signed_in_client(&server.url(), "tok"));
    let input = QuestionInput::Create(CreateQuestionInput {
        boda_id: BODA_ID.to_string(),
        pregunta: "¿Menú?".to_string(),
        opciones: vec!["Carne".to_string()],
        obligatoria: false,
        es_confirmacion: false,
        subpregunta: None,
    });

    let err = services.questions.save(&input).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_incomplete_answer_filter_issues_no_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/guests/filtrar")
        .expect(0)
        .create_async()
        .await;

    let services = Services::new(signed_in_client(&server.url(), "tok"));
    let mut roster = GuestRoster::new(services.guests.clone(), BODA_ID);
    let pregunta = Pregunta {
        id: "p-1".to_string(),
        boda_id: BODA_ID.to_string(),
        pregunta: "¿Menú?".to_string(),
        opciones: vec!["Carne".to_string(), "Pescado".to_string()],
        obligatoria: false,
        es_confirmacion: false,
        subpregunta: None,
        version: 0,
        created_at: now_str(),
        updated_at: now_str(),
    };

    assert!(roster.filter_by_answer(None, Some("Carne")).await.is_err());
    assert!(roster.filter_by_answer(Some(&pregunta), None).await.is_err());
    assert!(roster.filter_by_answer(Some(&pregunta), Some("Sushi")).await.is_err());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_invalid_list_never_reaches_the_server() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", "/lists").expect(0).create_async().await;

    let services = Services::new(signed_in_client(&server.url(), "tok"));
    let mut manager = ListManager::new(services.lists.clone(), BODA_ID);

    assert!(manager.create("ab", &["g-1".to_string()]).await.is_err());
    assert!(manager.create("Amigos", &[]).await.is_err());
    assert!(manager.listas().is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_roster_load_failure_sets_error_state() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", Matcher::Regex(r"^/guests/boda/boda-1".to_string()))
        .with_status(500)
        .with_body(r#"{"message": "boom"}"#)
        .create_async()
        .await;

    let services = Services::new(signed_in_client(&server.url(), "tok"));
    let mut roster = GuestRoster::new(services.guests.clone(), BODA_ID);

    assert!(roster.load(1).await.is_err());
    assert!(matches!(roster.state(), crate::roster::RosterState::Error(_)));
}
