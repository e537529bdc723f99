use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use boda_shared::auth::issue_token;
use boda_shared::store::InvitadoStore;
use boda_shared::test_utils::http_test_utils::response_to_json;
use chrono::Duration;
use tower::ServiceExt;

use super::*;

const BOUNDARY: &str = "----boda-test-boundary";

fn multipart_request(uri: &str, identity: &Identity, field: &str, csv: &str) -> Request<Body> {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{f}\"; filename=\"invitados.csv\"\r\nContent-Type: text/csv\r\n\r\n{csv}\r\n--{b}--\r\n",
        b = BOUNDARY,
        f = field,
        csv = csv
    );
    let token = issue_token(identity, Duration::hours(1)).unwrap();

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_import_reports_duplicates_in_file_and_wedding() {
    let (app, store) = create_test_app();
    seed_boda(&store).await;
    seed_guest(&store, "Ya invitada", "34600000009").await;

    // 10 rows: one repeats a row above, one repeats an existing guest
    let csv = "nombre,telefono,invitadoPor\n\
               Ana,600000001,novia\n\
               Luis,600000002,novio\n\
               Marta,600000003,\n\
               Pedro,600000004,\n\
               Lucía,600000005,\n\
               Jorge,600000006,\n\
               Elena,600000007,\n\
               Pablo,600000008,\n\
               Ana otra vez,+34 600 000 001,\n\
               Repetida,0034600000009,\n";

    let response = app
        .oneshot(multipart_request(
            &format!("/guests/import/{}", BODA_ID),
            &novio(),
            "file",
            csv,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_to_json(response).await;
    assert_eq!(body["creados"].as_array().unwrap().len(), 8);
    assert_eq!(body["duplicados"].as_array().unwrap().len(), 2);
    assert_eq!(body["duplicados"][0]["telefono"], "34600000001");
    assert_eq!(body["duplicados"][1]["nombre"], "Repetida");
    assert_eq!(body["creados"][0]["invitadoPor"], "novia");

    assert_eq!(store.get_invitados_by_boda(BODA_ID).await.unwrap().len(), 9);
}

#[tokio::test]
async fn test_import_keeps_invalid_rows_as_errors() {
    let (app, store) = create_test_app();
    seed_boda(&store).await;

    let csv = "Nombre;Teléfono\nAna;600000001\n;600000002\nLuis;abc123\n";
    let response = app
        .oneshot(multipart_request(
            &format!("/guests/import/{}", BODA_ID),
            &novio(),
            "file",
            csv,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_to_json(response).await;
    assert_eq!(body["creados"].as_array().unwrap().len(), 1);
    let errores = body["errores"].as_array().unwrap();
    assert_eq!(errores.len(), 2);
    assert_eq!(errores[0]["fila"], 3);
    assert_eq!(errores[1]["fila"], 4);
}

#[tokio::test]
async fn test_import_requires_file_field_and_columns() {
    let (app, store) = create_test_app();
    seed_boda(&store).await;
    let uri = format!("/guests/import/{}", BODA_ID);

    let response = app
        .clone()
        .oneshot(multipart_request(&uri, &novio(), "documento", "nombre,telefono\n"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(multipart_request(&uri, &novio(), "file", "nombre,email\nAna,a@b.c\n"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
