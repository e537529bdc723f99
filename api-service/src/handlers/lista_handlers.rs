use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use boda_shared::auth::Identity;
use boda_shared::models::{now_str, ListaDifusion, MIN_NOMBRE_LISTA};
use boda_shared::store::WeddingStore;
use log::{info, warn};
use std::collections::HashSet;

use super::ensure_manages;
use crate::error::{AppError, Result};
use crate::models::{CreateListaRequest, UpdateListaRequest};
use crate::state::AppState;

async fn load_lista<S: WeddingStore>(
    store: &S,
    identity: &Identity,
    id: &str,
) -> Result<ListaDifusion> {
    let lista = store.get_lista(id).await?;
    ensure_manages(identity, &lista.boda_id)?;
    Ok(lista)
}

/// Validates name and membership, returning the deduplicated member ids in
/// their original order.
async fn validate_lista<S: WeddingStore>(
    store: &S,
    boda_id: &str,
    nombre: &str,
    invitados: &[String],
) -> Result<Vec<String>> {
    if nombre.trim().chars().count() < MIN_NOMBRE_LISTA {
        return Err(AppError::bad_request(format!(
            "List name must have at least {} characters",
            MIN_NOMBRE_LISTA
        )));
    }
    if invitados.is_empty() {
        return Err(AppError::bad_request(
            "A list needs at least one guest".into(),
        ));
    }

    let known: HashSet<String> = store
        .get_invitados_by_boda(boda_id)
        .await?
        .into_iter()
        .map(|i| i.id)
        .collect();

    let mut seen = HashSet::new();
    let mut members = Vec::with_capacity(invitados.len());
    for id in invitados {
        if !known.contains(id) {
            warn!("List member {} is not a guest of boda_id={}", id, boda_id);
            return Err(AppError::bad_request(format!(
                "Guest {} does not belong to this wedding",
                id
            )));
        }
        if seen.insert(id.clone()) {
            members.push(id.clone());
        }
    }
    Ok(members)
}

/// Adds or removes `lista_id` in each guest's `listas` back-reference.
async fn sync_membership<S: WeddingStore>(
    store: &S,
    lista_id: &str,
    added: &[String],
    removed: &[String],
) -> Result<()> {
    for id in added {
        let mut invitado = store.get_invitado(id).await?;
        if !invitado.listas.iter().any(|l| l == lista_id) {
            invitado.listas.push(lista_id.to_string());
            invitado.updated_at = now_str();
            store.update_invitado(invitado).await?;
        }
    }
    for id in removed {
        match store.get_invitado(id).await {
            Ok(mut invitado) => {
                invitado.listas.retain(|l| l != lista_id);
                invitado.updated_at = now_str();
                store.update_invitado(invitado).await?;
            }
            Err(e) => warn!("Could not detach guest {} from list {}: {}", id, lista_id, e),
        }
    }
    Ok(())
}

// GET /lists/boda/:boda_id
pub async fn get_listas<S>(
    State(state): State<AppState<S>>,
    Path(boda_id): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<serde_json::Value>>
where
    S: WeddingStore,
{
    ensure_manages(&identity, &boda_id)?;

    let mut listas = state.store.get_listas_by_boda(&boda_id).await?;
    listas.sort_by(|a, b| a.nombre.cmp(&b.nombre));
    Ok(Json(serde_json::json!({ "listas": listas })))
}

// GET /lists/:id
pub async fn get_lista<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<serde_json::Value>>
where
    S: WeddingStore,
{
    let lista = load_lista(&*state.store, &identity, &id).await?;
    Ok(Json(serde_json::json!({ "lista": lista })))
}

// POST /lists
pub async fn create_lista<S>(
    State(state): State<AppState<S>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateListaRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)>
where
    S: WeddingStore,
{
    ensure_manages(&identity, &payload.boda_id)?;
    let members = validate_lista(
        &*state.store,
        &payload.boda_id,
        &payload.nombre,
        &payload.invitados,
    )
    .await?;

    let now = now_str();
    let lista = ListaDifusion {
        id: uuid::Uuid::new_v4().to_string(),
        boda_id: payload.boda_id,
        nombre: payload.nombre.trim().to_string(),
        invitados: members,
        version: 0,
        created_at: now.clone(),
        updated_at: now,
    };

    let created = state.store.create_lista(lista).await?;
    sync_membership(&*state.store, &created.id, &created.invitados, &[]).await?;

    info!(
        "Created list '{}' ({}) with {} guests",
        created.nombre,
        created.id,
        created.invitados.len()
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "lista": created })),
    ))
}

// PUT /lists/:id
pub async fn update_lista<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<UpdateListaRequest>,
) -> Result<Json<serde_json::Value>>
where
    S: WeddingStore,
{
    let existing = load_lista(&*state.store, &identity, &id).await?;
    let members = validate_lista(
        &*state.store,
        &existing.boda_id,
        &payload.nombre,
        &payload.invitados,
    )
    .await?;

    let added: Vec<String> = members
        .iter()
        .filter(|m| !existing.invitados.contains(m))
        .cloned()
        .collect();
    let removed: Vec<String> = existing
        .invitados
        .iter()
        .filter(|m| !members.contains(m))
        .cloned()
        .collect();

    let lista = ListaDifusion {
        nombre: payload.nombre.trim().to_string(),
        invitados: members,
        version: payload.version.unwrap_or(existing.version),
        updated_at: now_str(),
        ..existing
    };

    let updated = state.store.update_lista(lista).await?;
    sync_membership(&*state.store, &updated.id, &added, &removed).await?;

    info!(
        "Updated list {}: +{} -{} guests, version {}",
        updated.id,
        added.len(),
        removed.len(),
        updated.version
    );

    Ok(Json(serde_json::json!({ "lista": updated })))
}

// DELETE /lists/:id
pub async fn delete_lista<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<serde_json::Value>>
where
    S: WeddingStore,
{
    let lista = load_lista(&*state.store, &identity, &id).await?;

    state.store.delete_lista(&id).await?;
    sync_membership(&*state.store, &id, &[], &lista.invitados).await?;

    info!("Deleted list {} from boda_id={}", id, lista.boda_id);

    Ok(Json(
        serde_json::json!({ "message": "List deleted successfully." }),
    ))
}
