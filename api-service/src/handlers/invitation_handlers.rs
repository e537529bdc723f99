use axum::{
    extract::{Extension, State},
    Json,
};
use boda_shared::auth::Identity;
use boda_shared::models::{Invitado, PlantillaSlug};
use boda_shared::phone::normalize_phone;
use boda_shared::store::WeddingStore;
use boda_shared::template::{render, RenderContext};
use log::{error, info, warn};
use std::collections::HashMap;

use super::{ensure_manages, magic_link};
use crate::error::{AppError, Result};
use crate::models::{InvitationResult, SendInvitationsRequest, SendInvitationsResponse};
use crate::state::AppState;

/// Picks the message body: the chosen template, then the literal message, then
/// the wedding's first-contact template.
async fn resolve_contenido<S: WeddingStore>(
    store: &S,
    payload: &SendInvitationsRequest,
) -> Result<String> {
    if let Some(plantilla_id) = payload.plantilla_id.as_deref().filter(|s| !s.is_empty()) {
        let plantilla = store.get_plantilla(plantilla_id).await?;
        if plantilla.boda_id != payload.boda_id {
            return Err(AppError::bad_request(
                "Template does not belong to this wedding".into(),
            ));
        }
        return Ok(plantilla.contenido);
    }

    if let Some(mensaje) = payload.mensaje.as_deref().filter(|m| !m.trim().is_empty()) {
        return Ok(mensaje.to_string());
    }

    store
        .get_plantillas_by_boda(&payload.boda_id)
        .await?
        .into_iter()
        .find(|p| p.slug == PlantillaSlug::PrimerContacto)
        .map(|p| p.contenido)
        .ok_or_else(|| {
            AppError::bad_request(
                "No message, template or first-contact template to send".into(),
            )
        })
}

fn failed(nombre: &str, telefono: &str, invitado_id: Option<String>, error: String) -> InvitationResult {
    InvitationResult {
        nombre: nombre.to_string(),
        telefono: telefono.to_string(),
        invitado_id,
        ok: false,
        error: Some(error),
    }
}

// POST /invitaciones/enviar
pub async fn send_invitations<S>(
    State(state): State<AppState<S>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<SendInvitationsRequest>,
) -> Result<Json<SendInvitationsResponse>>
where
    S: WeddingStore,
{
    ensure_manages(&identity, &payload.boda_id)?;
    if payload.invitados.is_empty() {
        return Err(AppError::bad_request("No recipients given".into()));
    }

    let boda = state.store.get_boda(&payload.boda_id).await?;
    let contenido = resolve_contenido(&*state.store, &payload).await?;

    let mut by_phone: HashMap<String, Invitado> = state
        .store
        .get_invitados_by_boda(&boda.id)
        .await?
        .into_iter()
        .map(|i| (i.telefono.clone(), i))
        .collect();

    let mut resultados = Vec::with_capacity(payload.invitados.len());
    for target in &payload.invitados {
        let telefono = match normalize_phone(&target.telefono, &state.config.default_country_code) {
            Some(t) => t,
            None => {
                warn!("Skipping invitation to invalid phone '{}'", target.telefono);
                resultados.push(failed(
                    &target.nombre,
                    &target.telefono,
                    None,
                    format!("Invalid phone number: '{}'", target.telefono),
                ));
                continue;
            }
        };

        let invitado = match by_phone.get(&telefono) {
            Some(existing) => existing.clone(),
            None => {
                if target.nombre.trim().is_empty() {
                    resultados.push(failed(
                        &target.nombre,
                        &telefono,
                        None,
                        "Guest name is required".to_string(),
                    ));
                    continue;
                }
                let mut nuevo = Invitado::new(&boda.id, &target.nombre, &telefono);
                nuevo.invitado_por = target.invitado_por;
                let created = state.store.create_invitado(nuevo).await?;
                info!("Created guest {} while sending invitations", created.id);
                by_phone.insert(telefono.clone(), created.clone());
                created
            }
        };

        let (enlace, _) = magic_link(&state.config, &invitado)?;
        let mensaje = render(&contenido, &RenderContext::for_guest(&invitado, &boda, &enlace));

        match state.whatsapp.send(&telefono, &mensaje).await {
            Ok(_) => resultados.push(InvitationResult {
                nombre: invitado.nombre.clone(),
                telefono,
                invitado_id: Some(invitado.id.clone()),
                ok: true,
                error: None,
            }),
            Err(e) => {
                error!("Invitation to {} failed: {}", telefono, e);
                resultados.push(failed(
                    &invitado.nombre,
                    &telefono,
                    Some(invitado.id.clone()),
                    e.to_string(),
                ));
            }
        }
    }

    let enviados = resultados.iter().filter(|r| r.ok).count();
    let fallidos = resultados.len() - enviados;
    info!(
        "Invitations for boda_id={}: {} sent, {} failed",
        boda.id, enviados, fallidos
    );

    Ok(Json(SendInvitationsResponse {
        enviados,
        fallidos,
        resultados,
    }))
}
