use axum::{
    extract::{Extension, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use boda_shared::auth::Identity;
use boda_shared::import::parse_guest_rows;
use boda_shared::models::Invitado;
use boda_shared::store::WeddingStore;
use log::{info, warn};
use std::collections::HashSet;

use super::ensure_manages;
use crate::error::{AppError, Result};
use crate::models::{DuplicateGuest, ImportResponse, RowError};
use crate::state::AppState;

const FILE_FIELD: &str = "file";

async fn read_file_field(mut multipart: Multipart) -> Result<Vec<u8>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some(FILE_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::bad_request(format!("Could not read file: {}", e)))?;
            return Ok(bytes.to_vec());
        }
    }

    Err(AppError::bad_request(format!(
        "Missing multipart field '{}'",
        FILE_FIELD
    )))
}

// POST /guests/import/:boda_id
pub async fn import_guests<S>(
    State(state): State<AppState<S>>,
    Path(boda_id): Path<String>,
    Extension(identity): Extension<Identity>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ImportResponse>)>
where
    S: WeddingStore,
{
    ensure_manages(&identity, &boda_id)?;
    state.store.get_boda(&boda_id).await?;

    let data = read_file_field(multipart).await?;
    let rows = parse_guest_rows(&data, &state.config.default_country_code)?;

    let mut seen: HashSet<String> = state
        .store
        .get_invitados_by_boda(&boda_id)
        .await?
        .into_iter()
        .map(|i| i.telefono)
        .collect();

    let mut response = ImportResponse {
        creados: vec![],
        duplicados: vec![],
        errores: vec![],
    };

    for row in rows {
        let telefono = match (&row.problema, &row.telefono) {
            (None, Some(telefono)) => telefono.clone(),
            (problema, _) => {
                let motivo = problema
                    .clone()
                    .unwrap_or_else(|| "Fila no válida".to_string());
                warn!("Import row {} skipped: {}", row.fila, motivo);
                response.errores.push(RowError {
                    fila: row.fila,
                    motivo,
                });
                continue;
            }
        };

        // Within the file and against guests already in the wedding
        if !seen.insert(telefono.clone()) {
            response.duplicados.push(DuplicateGuest {
                nombre: row.nombre,
                telefono,
            });
            continue;
        }

        let mut invitado = Invitado::new(&boda_id, &row.nombre, &telefono);
        invitado.invitado_por = row.invitado_por;
        invitado.num_acompanantes = row.num_acompanantes;
        response
            .creados
            .push(state.store.create_invitado(invitado).await?);
    }

    info!(
        "Imported guests into boda_id={}: {} created, {} duplicates, {} errors",
        boda_id,
        response.creados.len(),
        response.duplicados.len(),
        response.errores.len()
    );

    Ok((StatusCode::CREATED, Json(response)))
}
