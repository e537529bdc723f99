use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use boda_shared::auth::Identity;
use boda_shared::models::{now_str, validate_pregunta, Invitado, Pregunta};
use boda_shared::store::WeddingStore;
use log::{debug, info};

use super::ensure_manages;
use crate::error::{AppError, Result};
use crate::models::{
    AssignRequest, AssignResponse, CreatePreguntaRequest, ModoAsignacion, UpdatePreguntaRequest,
};
use crate::state::AppState;

async fn load_pregunta<S: WeddingStore>(
    store: &S,
    identity: &Identity,
    id: &str,
) -> Result<Pregunta> {
    let pregunta = store.get_pregunta(id).await?;
    ensure_manages(identity, &pregunta.boda_id)?;
    Ok(pregunta)
}

fn trimmed(opciones: Vec<String>) -> Vec<String> {
    opciones.into_iter().map(|o| o.trim().to_string()).collect()
}

// GET /preguntas/boda/:boda_id
pub async fn get_preguntas<S>(
    State(state): State<AppState<S>>,
    Path(boda_id): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<Pregunta>>>
where
    S: WeddingStore,
{
    ensure_manages(&identity, &boda_id)?;

    let mut preguntas = state.store.get_preguntas_by_boda(&boda_id).await?;
    preguntas.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(Json(preguntas))
}

// GET /preguntas/:id
pub async fn get_pregunta<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Pregunta>>
where
    S: WeddingStore,
{
    Ok(Json(load_pregunta(&*state.store, &identity, &id).await?))
}

// POST /preguntas
pub async fn create_pregunta<S>(
    State(state): State<AppState<S>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreatePreguntaRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)>
where
    S: WeddingStore,
{
    ensure_manages(&identity, &payload.boda_id)?;
    state.store.get_boda(&payload.boda_id).await?;

    validate_pregunta(
        &payload.pregunta,
        &payload.opciones,
        payload.subpregunta.as_ref(),
    )
    .map_err(AppError::bad_request)?;

    let now = now_str();
    let pregunta = Pregunta {
        id: uuid::Uuid::new_v4().to_string(),
        boda_id: payload.boda_id,
        pregunta: payload.pregunta.trim().to_string(),
        opciones: trimmed(payload.opciones),
        obligatoria: payload.obligatoria,
        es_confirmacion: payload.es_confirmacion,
        subpregunta: payload.subpregunta,
        version: 0,
        created_at: now.clone(),
        updated_at: now,
    };

    let created = state.store.create_pregunta(pregunta).await?;
    info!(
        "Created pregunta {} for boda_id={}",
        created.id, created.boda_id
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "ok": true, "pregunta": created })),
    ))
}

// PUT /preguntas/:id
pub async fn update_pregunta<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<UpdatePreguntaRequest>,
) -> Result<Json<serde_json::Value>>
where
    S: WeddingStore,
{
    let existing = load_pregunta(&*state.store, &identity, &id).await?;

    validate_pregunta(
        &payload.pregunta,
        &payload.opciones,
        payload.subpregunta.as_ref(),
    )
    .map_err(AppError::bad_request)?;

    let pregunta = Pregunta {
        pregunta: payload.pregunta.trim().to_string(),
        opciones: trimmed(payload.opciones),
        obligatoria: payload.obligatoria,
        es_confirmacion: payload.es_confirmacion,
        subpregunta: payload.subpregunta,
        // Without a version the write wins over whatever is stored
        version: payload.version.unwrap_or(existing.version),
        updated_at: now_str(),
        ..existing
    };

    let updated = state.store.update_pregunta(pregunta).await?;

    let mut refreshed = 0;
    for mut invitado in state
        .store
        .get_invitados_by_boda(&updated.boda_id)
        .await?
    {
        if invitado.respuesta(&updated.id).is_some() {
            invitado.assign(&updated);
            invitado.updated_at = now_str();
            state.store.update_invitado(invitado).await?;
            refreshed += 1;
        }
    }

    info!(
        "Updated pregunta {} to version {}, refreshed {} guest snapshots",
        updated.id, updated.version, refreshed
    );

    Ok(Json(serde_json::json!({ "pregunta": updated })))
}

// DELETE /preguntas/:id
pub async fn delete_pregunta<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<serde_json::Value>>
where
    S: WeddingStore,
{
    let pregunta = load_pregunta(&*state.store, &identity, &id).await?;

    state.store.delete_pregunta(&id).await?;

    let mut stripped = 0;
    for mut invitado in state
        .store
        .get_invitados_by_boda(&pregunta.boda_id)
        .await?
    {
        if invitado.unassign(&id) {
            invitado.updated_at = now_str();
            state.store.update_invitado(invitado).await?;
            stripped += 1;
        }
    }

    info!(
        "Deleted pregunta {} and its answers from {} guests",
        id, stripped
    );

    Ok(Json(
        serde_json::json!({ "message": "Question deleted successfully." }),
    ))
}

async fn assignment_targets<S: WeddingStore>(
    store: &S,
    pregunta: &Pregunta,
    payload: &AssignRequest,
) -> Result<Vec<Invitado>> {
    match payload.modo {
        ModoAsignacion::Todos => Ok(store.get_invitados_by_boda(&pregunta.boda_id).await?),
        ModoAsignacion::Lista => {
            let lista_id = payload
                .lista_id
                .as_deref()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| AppError::bad_request("listaId is required".into()))?;
            let lista = store.get_lista(lista_id).await?;
            if lista.boda_id != pregunta.boda_id {
                return Err(AppError::bad_request(
                    "List does not belong to this wedding".into(),
                ));
            }
            let mut invitados = Vec::with_capacity(lista.invitados.len());
            for member in &lista.invitados {
                match store.get_invitado(member).await {
                    Ok(invitado) => invitados.push(invitado),
                    Err(e) => debug!("Skipping list member {}: {}", member, e),
                }
            }
            Ok(invitados)
        }
        ModoAsignacion::Invitado => {
            let invitado_id = payload
                .invitado_id
                .as_deref()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| AppError::bad_request("invitadoId is required".into()))?;
            let invitado = store.get_invitado(invitado_id).await?;
            if invitado.boda_id != pregunta.boda_id {
                return Err(AppError::bad_request(
                    "Guest does not belong to this wedding".into(),
                ));
            }
            Ok(vec![invitado])
        }
    }
}

// POST /preguntas/:id/asignar
pub async fn assign_pregunta<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<AssignRequest>,
) -> Result<Json<AssignResponse>>
where
    S: WeddingStore,
{
    let pregunta = load_pregunta(&*state.store, &identity, &id).await?;
    let invitados = assignment_targets(&*state.store, &pregunta, &payload).await?;

    let total = invitados.len();
    let mut asignados = 0;
    let mut actualizados = 0;
    for mut invitado in invitados {
        if invitado.assign(&pregunta) {
            asignados += 1;
        } else {
            actualizados += 1;
        }
        invitado.updated_at = now_str();
        state.store.update_invitado(invitado).await?;
    }

    info!(
        "Assigned pregunta {} ({:?}): {} new, {} refreshed",
        id, payload.modo, asignados, actualizados
    );

    Ok(Json(AssignResponse {
        asignados,
        actualizados,
        total,
    }))
}
