use axum::http::StatusCode;
use boda_shared::auth::create_test_request;
use boda_shared::models::Rol;
use boda_shared::store::{InvitadoStore, ListaStore};
use boda_shared::test_utils::http_test_utils::response_to_json;
use serde_json::json;
use tower::ServiceExt;

use super::*;

#[tokio::test]
async fn test_guest_page_reports_total_independent_of_page() {
    let (app, store) = create_test_app();
    seed_boda(&store).await;
    for i in 0..23 {
        seed_guest(&store, &format!("Invitado {:02}", i), &format!("3460000{:04}", i)).await;
    }

    let response = app
        .oneshot(create_test_request(
            "GET",
            &format!("/guests/boda/{}?page=3&limit=10", BODA_ID),
            &novio(),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_to_json(response).await;
    assert_eq!(body["total"], 23);
    assert_eq!(body["pagina"], 3);
    assert_eq!(body["totalPaginas"], 3);
    assert_eq!(body["invitados"].as_array().unwrap().len(), 3);
    assert_eq!(body["invitados"][0]["nombre"], "Invitado 20");
}

#[tokio::test]
async fn test_guest_page_past_the_end_is_empty() {
    let (app, store) = create_test_app();
    seed_boda(&store).await;
    for i in 0..5 {
        seed_guest(&store, &format!("Invitado {:02}", i), &format!("3460000{:04}", i)).await;
    }

    let response = app
        .oneshot(create_test_request(
            "GET",
            &format!("/guests/boda/{}?page={}&limit=10", BODA_ID, usize::MAX),
            &novio(),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_to_json(response).await;
    assert_eq!(body["total"], 5);
    assert_eq!(body["totalPaginas"], 1);
    assert!(body["invitados"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_guest_search_folds_accents_and_matches_phone_digits() {
    let (app, store) = create_test_app();
    seed_boda(&store).await;
    seed_guest(&store, "José Núñez", "34600111222").await;
    seed_guest(&store, "Marta Ruiz", "34655444333").await;

    let response = app
        .clone()
        .oneshot(create_test_request(
            "GET",
            &format!("/guests/boda/{}?search=jose%20nunez", BODA_ID),
            &novio(),
            None,
        ))
        .await
        .unwrap();
    let body = response_to_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["invitados"][0]["nombre"], "José Núñez");

    let response = app
        .oneshot(create_test_request(
            "GET",
            &format!("/guests/boda/{}?search=5444", BODA_ID),
            &novio(),
            None,
        ))
        .await
        .unwrap();
    let body = response_to_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["invitados"][0]["nombre"], "Marta Ruiz");
}

#[tokio::test]
async fn test_all_guests_is_a_bare_array() {
    let (app, store) = create_test_app();
    seed_boda(&store).await;
    seed_guest(&store, "Beatriz", "34600000002").await;
    seed_guest(&store, "Álvaro", "34600000001").await;

    let response = app
        .oneshot(create_test_request(
            "GET",
            &format!("/guests/boda/{}/all", BODA_ID),
            &admin(),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_to_json(response).await;
    let nombres: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["nombre"].as_str().unwrap())
        .collect();
    assert_eq!(nombres, vec!["Álvaro", "Beatriz"]);
}

#[tokio::test]
async fn test_create_guest_normalizes_phone_and_rejects_duplicates() {
    let (app, store) = create_test_app();
    seed_boda(&store).await;

    let response = app
        .clone()
        .oneshot(create_test_request(
            "POST",
            "/guests",
            &novio(),
            Some(json!({ "bodaId": BODA_ID, "nombre": "Ana", "telefono": "600 111 222", "invitadoPor": "novia" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_to_json(response).await;
    assert_eq!(body["invitado"]["telefono"], "34600111222");
    assert_eq!(body["invitado"]["invitadoPor"], "novia");

    let response = app
        .clone()
        .oneshot(create_test_request(
            "POST",
            "/guests",
            &novio(),
            Some(json!({ "bodaId": BODA_ID, "nombre": "Ana bis", "telefono": "+34 600-111-222" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .oneshot(create_test_request(
            "POST",
            "/guests",
            &novio(),
            Some(json!({ "bodaId": BODA_ID, "nombre": "Sin número", "telefono": "abc123" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(store.get_invitados_by_boda(BODA_ID).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_couple_cannot_touch_another_wedding() {
    let (app, store) = create_test_app();
    seed_boda(&store).await;
    let other = Identity::new("novio-2", Rol::Novio, Some("otra-boda"));

    let response = app
        .oneshot(create_test_request(
            "GET",
            &format!("/guests/boda/{}/all", BODA_ID),
            &other,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_patch_guest_distinguishes_null_from_absent() {
    let (app, store) = create_test_app();
    seed_boda(&store).await;
    let mut invitado = seed_guest(&store, "Ana", "34600111222").await;
    invitado.confirmado = Some(true);
    store.update_invitado(invitado.clone()).await.unwrap();

    let response = app
        .clone()
        .oneshot(create_test_request(
            "PATCH",
            &format!("/guests/{}", invitado.id),
            &novio(),
            Some(json!({ "numAcompanantes": 2 })),
        ))
        .await
        .unwrap();
    let body = response_to_json(response).await;
    assert_eq!(body["invitado"]["confirmado"], true);
    assert_eq!(body["invitado"]["numAcompanantes"], 2);

    let response = app
        .oneshot(create_test_request(
            "PATCH",
            &format!("/guests/{}", invitado.id),
            &novio(),
            Some(json!({ "confirmado": null })),
        ))
        .await
        .unwrap();
    let body = response_to_json(response).await;
    assert!(body["invitado"]["confirmado"].is_null());
}

#[tokio::test]
async fn test_delete_guest_removes_list_membership() {
    let (app, store) = create_test_app();
    seed_boda(&store).await;
    let ana = seed_guest(&store, "Ana", "34600000001").await;
    let luis = seed_guest(&store, "Luis", "34600000002").await;
    let lista = seed_list(&store, "Familia", &[&ana, &luis]).await;

    let response = app
        .oneshot(create_test_request(
            "DELETE",
            &format!("/guests/{}", ana.id),
            &novio(),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(store.get_invitado(&ana.id).await.is_err());
    assert_eq!(store.get_lista(&lista.id).await.unwrap().invitados, vec![luis.id]);
}

#[tokio::test]
async fn test_filter_by_answer_is_case_and_accent_insensitive() {
    let (app, store) = create_test_app();
    seed_boda(&store).await;
    let pregunta = seed_question(&store, attendance_question()).await;

    let mut ana = seed_guest(&store, "Ana", "34600000001").await;
    ana.assign(&pregunta);
    ana.respuestas[0].respuesta = Some("Sí".to_string());
    store.update_invitado(ana).await.unwrap();

    let mut luis = seed_guest(&store, "Luis", "34600000002").await;
    luis.assign(&pregunta);
    luis.respuestas[0].respuesta = Some("No".to_string());
    store.update_invitado(luis).await.unwrap();

    let response = app
        .clone()
        .oneshot(create_test_request(
            "POST",
            "/guests/filtrar",
            &novio(),
            Some(json!({ "bodaId": BODA_ID, "preguntaId": pregunta.id, "respuesta": "si" })),
        ))
        .await
        .unwrap();
    let body = response_to_json(response).await;
    let invitados = body["invitados"].as_array().unwrap();
    assert_eq!(invitados.len(), 1);
    assert_eq!(invitados[0]["nombre"], "Ana");

    // Valid filter with no matches is an empty list, not an error
    let response = app
        .oneshot(create_test_request(
            "POST",
            "/guests/filtrar",
            &novio(),
            Some(json!({ "bodaId": BODA_ID, "preguntaId": pregunta.id, "respuesta": "Quizás" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_to_json(response).await;
    assert!(body["invitados"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_answers_reject_unassigned_questions_and_unknown_options() {
    let (app, store) = create_test_app();
    seed_boda(&store).await;
    let pregunta = seed_question(&store, attendance_question()).await;
    let invitado = seed_guest(&store, "Ana", "34600000001").await;
    let uri = format!("/guests/{}/respuestas", invitado.id);

    let response = app
        .clone()
        .oneshot(create_test_request(
            "PUT",
            &uri,
            &novio(),
            Some(json!({ "respuestas": [{ "preguntaId": pregunta.id, "respuesta": "Sí" }] })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut assigned = store.get_invitado(&invitado.id).await.unwrap();
    assigned.assign(&pregunta);
    store.update_invitado(assigned).await.unwrap();

    let response = app
        .clone()
        .oneshot(create_test_request(
            "PUT",
            &uri,
            &novio(),
            Some(json!({ "respuestas": [{ "preguntaId": pregunta.id, "respuesta": "Tal vez" }] })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(create_test_request(
            "PUT",
            &uri,
            &novio(),
            Some(json!({ "respuestas": [{ "preguntaId": pregunta.id, "respuesta": "no", "subrespuesta": "Ida" }] })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_to_json(response).await;
    assert_eq!(body["invitado"]["confirmado"], false);
    assert_eq!(body["invitado"]["respuestas"][0]["respuesta"], "No");
    // Sub-question does not apply to "No"
    assert!(body["invitado"]["respuestas"][0]["subrespuesta"].is_null());
}

#[tokio::test]
async fn test_magic_link_points_at_panel() {
    let (app, store) = create_test_app();
    seed_boda(&store).await;
    let invitado = seed_guest(&store, "Ana", "34600000001").await;

    let response = app
        .oneshot(create_test_request(
            "GET",
            &format!("/guests/{}/enlace", invitado.id),
            &novio(),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_to_json(response).await;
    let token = body["token"].as_str().unwrap();
    assert_eq!(
        body["enlace"],
        format!("https://bodas.test/acceso?token={}", token)
    );

    let decoded = boda_shared::auth::decode_token(token).unwrap();
    assert_eq!(decoded, guest_identity(&invitado));
}
