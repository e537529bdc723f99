use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use boda_shared::auth::Identity;
use boda_shared::models::{now_str, Invitado, Pregunta};
use boda_shared::phone::normalize_phone;
use boda_shared::store::WeddingStore;
use boda_shared::text::{fold, matches_guest};
use log::{debug, info};

use super::{ensure_manages, magic_link, sort_by_nombre};
use crate::error::{AppError, Result};
use crate::models::{
    AnswerInput, AnswersRequest, CreateGuestRequest, FilterRequest, GuestPageResponse,
    MagicLinkResponse, OptionalField, PageQuery, UpdateGuestRequest,
};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: usize = 10;
const MAX_PAGE_SIZE: usize = 100;

/// Loads a guest and checks the caller manages its wedding.
pub(crate) async fn load_guest<S: WeddingStore>(
    store: &S,
    identity: &Identity,
    id: &str,
) -> Result<Invitado> {
    let invitado = store.get_invitado(id).await?;
    ensure_manages(identity, &invitado.boda_id)?;
    Ok(invitado)
}

pub(crate) fn normalize_or_reject(telefono: &str, default_cc: &str) -> Result<String> {
    normalize_phone(telefono, default_cc).ok_or_else(|| {
        AppError::bad_request(format!("Invalid phone number: '{}'", telefono))
    })
}

/// Records a batch of answers on the guest. Every answer must target an assigned
/// question and match one of its options; sub-answers are kept only when the
/// sub-question applies. Answering the attendance question sets `confirmado`.
pub(crate) fn apply_answers(
    invitado: &mut Invitado,
    respuestas: &[AnswerInput],
    preguntas: &[Pregunta],
) -> Result<()> {
    for input in respuestas {
        let record = invitado
            .respuestas
            .iter_mut()
            .find(|r| r.pregunta_id == input.pregunta_id)
            .ok_or_else(|| {
                AppError::bad_request(format!(
                    "Question {} is not assigned to this guest",
                    input.pregunta_id
                ))
            })?;

        let wanted = fold(input.respuesta.trim());
        let elegida = record
            .opciones
            .iter()
            .find(|o| fold(o.trim()) == wanted)
            .cloned()
            .ok_or_else(|| {
                AppError::bad_request(format!(
                    "'{}' is not an option of '{}'",
                    input.respuesta, record.pregunta
                ))
            })?;

        let subrespuesta = match &record.subpregunta {
            Some(sub) if sub.applies_to(&elegida) => {
                match input
                    .subrespuesta
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                {
                    Some(valor) => Some(
                        sub.opciones
                            .iter()
                            .find(|o| fold(o.trim()) == fold(valor))
                            .cloned()
                            .ok_or_else(|| {
                                AppError::bad_request(format!(
                                    "'{}' is not an option of '{}'",
                                    valor, sub.pregunta
                                ))
                            })?,
                    ),
                    None => None,
                }
            }
            _ => None,
        };

        record.respuesta = Some(elegida.clone());
        record.subrespuesta = subrespuesta;

        let es_confirmacion = preguntas
            .iter()
            .any(|p| p.id == input.pregunta_id && p.es_confirmacion);
        if es_confirmacion {
            invitado.confirmado = Some(fold(&elegida).starts_with("si"));
        }
    }

    invitado.updated_at = now_str();
    Ok(())
}

// GET /guests/boda/:boda_id
pub async fn get_guests_page<S>(
    State(state): State<AppState<S>>,
    Path(boda_id): Path<String>,
    Query(query): Query<PageQuery>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<GuestPageResponse>>
where
    S: WeddingStore,
{
    ensure_manages(&identity, &boda_id)?;

    let mut invitados = state.store.get_invitados_by_boda(&boda_id).await?;
    sort_by_nombre(&mut invitados);

    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        invitados.retain(|i| matches_guest(&i.nombre, &i.telefono, search));
    }

    let limite = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let pagina = query.page.unwrap_or(1).max(1);
    let total = invitados.len();
    let total_paginas = ((total + limite - 1) / limite).max(1);

    let invitados = invitados
        .into_iter()
        .skip(pagina.saturating_sub(1).saturating_mul(limite))
        .take(limite)
        .collect();

    Ok(Json(GuestPageResponse {
        invitados,
        total,
        pagina,
        limite,
        total_paginas,
    }))
}

// GET /guests/boda/:boda_id/all
pub async fn get_all_guests<S>(
    State(state): State<AppState<S>>,
    Path(boda_id): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<Invitado>>>
where
    S: WeddingStore,
{
    ensure_manages(&identity, &boda_id)?;

    let mut invitados = state.store.get_invitados_by_boda(&boda_id).await?;
    sort_by_nombre(&mut invitados);
    Ok(Json(invitados))
}

// GET /guests/:id
pub async fn get_guest<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<serde_json::Value>>
where
    S: WeddingStore,
{
    let invitado = load_guest(&*state.store, &identity, &id).await?;
    Ok(Json(serde_json::json!({ "invitado": invitado })))
}

// POST /guests
pub async fn create_guest<S>(
    State(state): State<AppState<S>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateGuestRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)>
where
    S: WeddingStore,
{
    ensure_manages(&identity, &payload.boda_id)?;
    state.store.get_boda(&payload.boda_id).await?;

    if payload.nombre.trim().is_empty() {
        return Err(AppError::bad_request("Guest name is required".into()));
    }
    let telefono = normalize_or_reject(&payload.telefono, &state.config.default_country_code)?;

    let existing = state.store.get_invitados_by_boda(&payload.boda_id).await?;
    if let Some(dup) = existing.iter().find(|i| i.telefono == telefono) {
        return Err(AppError::conflict(format!(
            "Phone {} already belongs to guest {}",
            telefono, dup.nombre
        )));
    }

    let mut invitado = Invitado::new(&payload.boda_id, &payload.nombre, &telefono);
    invitado.invitado_por = payload.invitado_por;
    invitado.num_acompanantes = payload.num_acompanantes.unwrap_or(0);

    let created = state.store.create_invitado(invitado).await?;
    info!(
        "Created guest {} for boda_id={}",
        created.id, created.boda_id
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "invitado": created })),
    ))
}

// PATCH /guests/:id
pub async fn update_guest<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<UpdateGuestRequest>,
) -> Result<Json<serde_json::Value>>
where
    S: WeddingStore,
{
    let mut invitado = load_guest(&*state.store, &identity, &id).await?;

    if let Some(nombre) = payload.nombre {
        if nombre.trim().is_empty() {
            return Err(AppError::bad_request("Guest name is required".into()));
        }
        invitado.nombre = nombre.trim().to_string();
    }

    if let Some(telefono) = payload.telefono {
        let telefono = normalize_or_reject(&telefono, &state.config.default_country_code)?;
        if telefono != invitado.telefono {
            let existing = state.store.get_invitados_by_boda(&invitado.boda_id).await?;
            if existing.iter().any(|i| i.id != invitado.id && i.telefono == telefono) {
                return Err(AppError::conflict(format!(
                    "Phone {} already belongs to another guest",
                    telefono
                )));
            }
            invitado.telefono = telefono;
        }
    }

    if let Some(field) = payload.invitado_por {
        invitado.invitado_por = field.into_option();
    }

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

    Ok(Json(serde_json::json!({ "invitado": updated })))
}

// DELETE /guests/:id
pub async fn delete_guest<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<serde_json::Value>>
where
    S: WeddingStore,
{
    let invitado = load_guest(&*state.store, &identity, &id).await?;

    // Drop the guest from every list that references it
    for lista_id in &invitado.listas {
        match state.store.get_lista(lista_id).await {
            Ok(mut lista) => {
                lista.invitados.retain(|m| m != &invitado.id);
                lista.updated_at = now_str();
                state.store.update_lista(lista).await?;
            }
            Err(e) => debug!("List {} referenced by guest {} is gone: {}", lista_id, id, e),
        }
    }

    state.store.delete_invitado(&id).await?;
    info!("Deleted guest {} from boda_id={}", id, invitado.boda_id);

    Ok(Json(
        serde_json::json!({ "message": "Guest deleted successfully." }),
    ))
}

// POST /guests/filtrar
pub async fn filter_guests<S>(
    State(state): State<AppState<S>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<FilterRequest>,
) -> Result<Json<serde_json::Value>>
where
    S: WeddingStore,
{
    ensure_manages(&identity, &payload.boda_id)?;

    if payload.pregunta_id.trim().is_empty() || payload.respuesta.trim().is_empty() {
        return Err(AppError::bad_request(
            "Both preguntaId and respuesta are required".into(),
        ));
    }

    let pregunta = state.store.get_pregunta(&payload.pregunta_id).await?;
    if pregunta.boda_id != payload.boda_id {
        return Err(AppError::bad_request(
            "Question does not belong to this wedding".into(),
        ));
    }

    let wanted = fold(payload.respuesta.trim());
    let mut invitados: Vec<Invitado> = state
        .store
        .get_invitados_by_boda(&payload.boda_id)
        .await?
        .into_iter()
        .filter(|i| {
            i.respuesta(&pregunta.id)
                .and_then(|r| r.respuesta.as_deref())
                .map(|r| fold(r.trim()) == wanted)
                .unwrap_or(false)
        })
        .collect();
    sort_by_nombre(&mut invitados);

    info!(
        "Filter on pregunta_id={} respuesta='{}' matched {} guests",
        pregunta.id,
        payload.respuesta,
        invitados.len()
    );

    Ok(Json(serde_json::json!({ "invitados": invitados })))
}

// PUT /guests/:id/respuestas
pub async fn update_guest_answers<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<AnswersRequest>,
) -> Result<Json<serde_json::Value>>
where
    S: WeddingStore,
{
    let mut invitado = load_guest(&*state.store, &identity, &id).await?;
    let preguntas = state
        .store
        .get_preguntas_by_boda(&invitado.boda_id)
        .await?;

    apply_answers(&mut invitado, &payload.respuestas, &preguntas)?;
    let updated = state.store.update_invitado(invitado).await?;

    Ok(Json(serde_json::json!({ "invitado": updated })))
}

// GET /guests/:id/enlace
pub async fn get_magic_link<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<MagicLinkResponse>>
where
    S: WeddingStore,
{
    let invitado = load_guest(&*state.store, &identity, &id).await?;
    let (enlace, token) = magic_link(&state.config, &invitado)?;
    Ok(Json(MagicLinkResponse { enlace, token }))
}
