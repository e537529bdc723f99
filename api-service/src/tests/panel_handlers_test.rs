use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use boda_shared::auth::create_test_request;
use boda_shared::store::InvitadoStore;
use boda_shared::test_utils::http_test_utils::response_to_json;
use serde_json::json;
use tower::ServiceExt;

use super::*;

#[tokio::test]
async fn test_guest_sees_own_record_and_wedding() {
    let (app, store) = create_test_app();
    seed_boda(&store).await;
    let ana = seed_guest(&store, "Ana", "34600000001").await;

    let response = app
        .oneshot(create_test_request("GET", "/guests/me", &guest_identity(&ana), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_to_json(response).await;
    assert_eq!(body["invitado"]["_id"], ana.id.as_str());
    assert_eq!(body["boda"]["nombre"], "Ana y Luis");
    assert_eq!(body["boda"]["fecha"], "2027-06-12");
}

#[tokio::test]
async fn test_panel_requires_guest_token() {
    let (app, store) = create_test_app();
    seed_boda(&store).await;

    let response = app
        .clone()
        .oneshot(create_test_request("GET", "/guests/me", &novio(), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/guests/me")
                .header(header::AUTHORIZATION, "Bearer not-a-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_magic_link_token_opens_the_panel() {
    let (app, store) = create_test_app();
    seed_boda(&store).await;
    let ana = seed_guest(&store, "Ana", "34600000001").await;

    let response = app
        .clone()
        .oneshot(create_test_request(
            "GET",
            &format!("/guests/{}/enlace", ana.id),
            &novio(),
            None,
        ))
        .await
        .unwrap();
    let token = response_to_json(response).await["token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/guests/me")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_to_json(response).await["invitado"]["nombre"], "Ana");
}

#[tokio::test]
async fn test_confirmation_answer_sets_attendance() {
    let (app, store) = create_test_app();
    seed_boda(&store).await;
    let pregunta = seed_question(&store, attendance_question()).await;
    let mut ana = seed_guest(&store, "Ana", "34600000001").await;
    ana.assign(&pregunta);
    store.update_invitado(ana.clone()).await.unwrap();

    let response = app
        .oneshot(create_test_request(
            "PUT",
            "/guests/me/respuestas",
            &guest_identity(&ana),
            Some(json!({
                "respuestas": [{ "preguntaId": pregunta.id, "respuesta": "si", "subrespuesta": "ida y vuelta" }]
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let stored = store.get_invitado(&ana.id).await.unwrap();
    assert_eq!(stored.confirmado, Some(true));
    assert_eq!(stored.respuestas[0].respuesta.as_deref(), Some("Sí"));
    assert_eq!(stored.respuestas[0].subrespuesta.as_deref(), Some("Ida y vuelta"));
}

#[tokio::test]
async fn test_guest_updates_attendance_and_companions() {
    let (app, store) = create_test_app();
    seed_boda(&store).await;
    let ana = seed_guest(&store, "Ana", "34600000001").await;

    let response = app
        .oneshot(create_test_request(
            "PATCH",
            "/guests/me",
            &guest_identity(&ana),
            Some(json!({ "confirmado": true, "numAcompanantes": 1 })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let stored = store.get_invitado(&ana.id).await.unwrap();
    assert_eq!(stored.confirmado, Some(true));
    assert_eq!(stored.num_acompanantes, 1);
}
