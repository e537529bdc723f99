use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use boda_shared::auth::Identity;
use boda_shared::models::{now_str, Plantilla, PlantillaSlug};
use boda_shared::store::WeddingStore;
use boda_shared::template::{render, RenderContext};
use log::info;

use super::{ensure_manages, magic_link};
use crate::error::{AppError, Result};
use crate::models::{CreatePlantillaRequest, RenderRequest, UpdatePlantillaRequest};
use crate::state::AppState;

async fn load_plantilla<S: WeddingStore>(
    store: &S,
    identity: &Identity,
    id: &str,
) -> Result<Plantilla> {
    let plantilla = store.get_plantilla(id).await?;
    ensure_manages(identity, &plantilla.boda_id)?;
    Ok(plantilla)
}

/// System slugs are unique per wedding; `except` is the template being edited.
async fn ensure_slug_free<S: WeddingStore>(
    store: &S,
    boda_id: &str,
    slug: PlantillaSlug,
    except: Option<&str>,
) -> Result<()> {
    if !slug.is_system() {
        return Ok(());
    }
    let taken = store
        .get_plantillas_by_boda(boda_id)
        .await?
        .into_iter()
        .any(|p| p.slug == slug && Some(p.id.as_str()) != except);
    if taken {
        return Err(AppError::conflict(format!(
            "This wedding already has a '{}' template",
            slug
        )));
    }
    Ok(())
}

fn ensure_content(nombre: &str, contenido: &str) -> Result<()> {
    if nombre.trim().is_empty() || contenido.trim().is_empty() {
        return Err(AppError::bad_request(
            "Template name and content are required".into(),
        ));
    }
    Ok(())
}

// GET /plantillas/boda/:boda_id
pub async fn get_plantillas<S>(
    State(state): State<AppState<S>>,
    Path(boda_id): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<serde_json::Value>>
where
    S: WeddingStore,
{
    ensure_manages(&identity, &boda_id)?;

    let mut plantillas = state.store.get_plantillas_by_boda(&boda_id).await?;
    plantillas.sort_by(|a, b| a.nombre.cmp(&b.nombre));
    Ok(Json(
        serde_json::json!({ "ok": true, "plantillas": plantillas }),
    ))
}

// POST /plantillas
pub async fn create_plantilla<S>(
    State(state): State<AppState<S>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreatePlantillaRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)>
where
    S: WeddingStore,
{
    ensure_manages(&identity, &payload.boda_id)?;
    ensure_content(&payload.nombre, &payload.contenido)?;
    ensure_slug_free(&*state.store, &payload.boda_id, payload.slug, None).await?;

    let now = now_str();
    let plantilla = Plantilla {
        id: uuid::Uuid::new_v4().to_string(),
        boda_id: payload.boda_id,
        usuario_id: identity.user_id.clone(),
        nombre: payload.nombre.trim().to_string(),
        contenido: payload.contenido,
        slug: payload.slug,
        created_at: now.clone(),
        updated_at: now,
    };

    let created = state.store.create_plantilla(plantilla).await?;
    info!(
        "Created plantilla {} ({}) for boda_id={}",
        created.id, created.slug, created.boda_id
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "ok": true, "plantilla": created })),
    ))
}

// PUT /plantillas/:id
pub async fn update_plantilla<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<UpdatePlantillaRequest>,
) -> Result<Json<serde_json::Value>>
where
    S: WeddingStore,
{
    let mut plantilla = load_plantilla(&*state.store, &identity, &id).await?;

    if let Some(nombre) = payload.nombre {
        plantilla.nombre = nombre.trim().to_string();
    }
    if let Some(contenido) = payload.contenido {
        plantilla.contenido = contenido;
    }
    if let Some(slug) = payload.slug {
        if slug != plantilla.slug {
            ensure_slug_free(&*state.store, &plantilla.boda_id, slug, Some(&id)).await?;
            plantilla.slug = slug;
        }
    }
    ensure_content(&plantilla.nombre, &plantilla.contenido)?;

    plantilla.updated_at = now_str();
    let updated = state.store.update_plantilla(plantilla).await?;

    Ok(Json(
        serde_json::json!({ "ok": true, "plantilla": updated }),
    ))
}

// DELETE /plantillas/:id
pub async fn delete_plantilla<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<serde_json::Value>>
where
    S: WeddingStore,
{
    let plantilla = load_plantilla(&*state.store, &identity, &id).await?;
    state.store.delete_plantilla(&id).await?;
    info!("Deleted plantilla {} from boda_id={}", id, plantilla.boda_id);

    Ok(Json(
        serde_json::json!({ "ok": true, "message": "Template deleted successfully." }),
    ))
}

// POST /plantillas/:id/render
pub async fn render_plantilla<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<RenderRequest>,
) -> Result<Json<serde_json::Value>>
where
    S: WeddingStore,
{
    let plantilla = load_plantilla(&*state.store, &identity, &id).await?;
    let invitado = state.store.get_invitado(&payload.invitado_id).await?;
    if invitado.boda_id != plantilla.boda_id {
        return Err(AppError::bad_request(
            "Guest does not belong to this wedding".into(),
        ));
    }
    let boda = state.store.get_boda(&plantilla.boda_id).await?;

    let (enlace, _) = magic_link(&state.config, &invitado)?;
    let mensaje = render(
        &plantilla.contenido,
        &RenderContext::for_guest(&invitado, &boda, &enlace),
    );

    Ok(Json(serde_json::json!({ "mensaje": mensaje })))
}
