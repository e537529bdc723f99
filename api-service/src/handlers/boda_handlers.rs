use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use boda_shared::auth::Identity;
use boda_shared::models::{now_str, Boda, Rol};
use boda_shared::store::WeddingStore;
use log::info;

use super::{ensure_admin, ensure_manages};
use crate::error::{AppError, Result};
use crate::models::{CreateBodaRequest, UpdateBodaRequest};
use crate::state::AppState;

// GET /bodas
pub async fn get_bodas<S>(
    State(state): State<AppState<S>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<serde_json::Value>>
where
    S: WeddingStore,
{
    let bodas = match identity.rol {
        Rol::Admin => {
            let mut bodas = state.store.get_bodas().await?;
            bodas.sort_by(|a, b| a.fecha.cmp(&b.fecha));
            bodas
        }
        Rol::Novio => match identity.boda_id.as_deref() {
            Some(boda_id) => vec![state.store.get_boda(boda_id).await?],
            None => vec![],
        },
        Rol::Invitado => {
            return Err(AppError::forbidden("Guests cannot list weddings".into()))
        }
    };

    Ok(Json(serde_json::json!({ "bodas": bodas })))
}

// GET /bodas/:id
pub async fn get_boda<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<serde_json::Value>>
where
    S: WeddingStore,
{
    ensure_manages(&identity, &id)?;
    let boda = state.store.get_boda(&id).await?;
    Ok(Json(serde_json::json!({ "boda": boda })))
}

// POST /bodas
pub async fn create_boda<S>(
    State(state): State<AppState<S>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateBodaRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)>
where
    S: WeddingStore,
{
    ensure_admin(&identity)?;
    if payload.nombre.trim().is_empty() {
        return Err(AppError::bad_request("Wedding name is required".into()));
    }

    let now = now_str();
    let boda = Boda {
        id: uuid::Uuid::new_v4().to_string(),
        nombre: payload.nombre.trim().to_string(),
        fecha: payload.fecha,
        ubicacion: payload.ubicacion,
        telefono_contacto: payload.telefono_contacto,
        detalles: payload.detalles,
        created_at: now.clone(),
        updated_at: now,
    };

    let created = state.store.create_boda(boda).await?;
    info!("Created boda {} ({})", created.id, created.nombre);

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "boda": created })),
    ))
}

// PATCH /bodas/:id
pub async fn update_boda<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<UpdateBodaRequest>,
) -> Result<Json<serde_json::Value>>
where
    S: WeddingStore,
{
    ensure_manages(&identity, &id)?;
    let mut boda = state.store.get_boda(&id).await?;

    if let Some(nombre) = payload.nombre {
        if nombre.trim().is_empty() {
            return Err(AppError::bad_request("Wedding name is required".into()));
        }
        boda.nombre = nombre.trim().to_string();
    }
    if let Some(field) = payload.fecha {
        boda.fecha = field.into_option();
    }
    if let Some(field) = payload.ubicacion {
        boda.ubicacion = field.into_option();
    }
    if let Some(field) = payload.telefono_contacto {
        boda.telefono_contacto = field.into_option();
    }
    if let Some(field) = payload.detalles {
        boda.detalles = field.into_option();
    }

    boda.updated_at = now_str();
    let updated = state.store.update_boda(boda).await?;

    Ok(Json(serde_json::json!({ "boda": updated })))
}
