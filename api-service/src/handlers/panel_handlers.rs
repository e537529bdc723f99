//! Guest self-service. The guest is always the token's subject, never a path id.

use axum::{
    extract::{Extension, State},
    Json,
};
use boda_shared::auth::Identity;
use boda_shared::models::{now_str, Invitado, Rol};
use boda_shared::store::WeddingStore;
use log::info;

use super::guest_handlers::apply_answers;
use crate::error::{AppError, Result};
use crate::models::{AnswersRequest, OptionalField, PanelBoda, PanelUpdateRequest};
use crate::state::AppState;

async fn current_guest<S: WeddingStore>(store: &S, identity: &Identity) -> Result<Invitado> {
    if identity.rol != Rol::Invitado {
        return Err(AppError::forbidden(
            "Only guests have a personal panel".into(),
        ));
    }
    let invitado = store.get_invitado(&identity.user_id).await?;
    if identity.boda_id.as_deref() != Some(invitado.boda_id.as_str()) {
        return Err(AppError::forbidden("Link does not match this guest".into()));
    }
    Ok(invitado)
}

// GET /guests/me
pub async fn get_me<S>(
    State(state): State<AppState<S>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<serde_json::Value>>
where
    S: WeddingStore,
{
    let invitado = current_guest(&*state.store, &identity).await?;
    let boda = state.store.get_boda(&invitado.boda_id).await?;

    let boda = PanelBoda {
        nombre: boda.nombre,
        fecha: boda.fecha,
        ubicacion: boda.ubicacion,
        detalles: boda.detalles,
    };

    Ok(Json(serde_json::json!({ "invitado": invitado, "boda": boda })))
}

// PATCH /guests/me
pub async fn update_me<S>(
    State(state): State<AppState<S>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<PanelUpdateRequest>,
) -> Result<Json<serde_json::Value>>
where
    S: WeddingStore,
{
    let mut invitado = current_guest(&*state.store, &identity).await?;

    if let Some(field) = payload.confirmado {
        invitado.confirmado = match field {
            OptionalField::Value(v) => Some(v),
            OptionalField::Null => None,
        };
    }
    if let Some(n) = payload.num_acompanantes {
        invitado.num_acompanantes = n;
    }

    invitado.updated_at = now_str();
    let updated = state.store.update_invitado(invitado).await?;
    info!(
        "Guest {} updated their attendance: {:?}",
        updated.id, updated.confirmado
    );

    Ok(Json(serde_json::json!({ "invitado": updated })))
}

// PUT /guests/me/respuestas
pub async fn update_my_answers<S>(
    State(state): State<AppState<S>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<AnswersRequest>,
) -> Result<Json<serde_json::Value>>
where
    S: WeddingStore,
{
    let mut invitado = current_guest(&*state.store, &identity).await?;
    let preguntas = state
        .store
        .get_preguntas_by_boda(&invitado.boda_id)
        .await?;

    apply_answers(&mut invitado, &payload.respuestas, &preguntas)?;
    let updated = state.store.update_invitado(invitado).await?;
    info!(
        "Guest {} answered {} questions",
        updated.id,
        payload.respuestas.len()
    );

    Ok(Json(serde_json::json!({ "invitado": updated })))
}
