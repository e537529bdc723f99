use axum::{
    extract::{Extension, Path, State},
    Json,
};
use boda_shared::auth::Identity;
use boda_shared::models::{Invitado, Pregunta};
use boda_shared::store::WeddingStore;
use std::collections::BTreeMap;

use super::ensure_manages;
use crate::error::Result;
use crate::models::{BodaStats, PreguntaStats};
use crate::state::AppState;

fn pregunta_stats(pregunta: &Pregunta, invitados: &[Invitado]) -> PreguntaStats {
    let mut conteo: BTreeMap<String, usize> = pregunta
        .opciones
        .iter()
        .map(|o| (o.clone(), 0))
        .collect();
    let mut sin_responder = 0;

    for respuesta in invitados.iter().filter_map(|i| i.respuesta(&pregunta.id)) {
        match respuesta.respuesta.as_deref() {
            Some(valor) => *conteo.entry(valor.to_string()).or_insert(0) += 1,
            None => sin_responder += 1,
        }
    }

    PreguntaStats {
        pregunta_id: pregunta.id.clone(),
        pregunta: pregunta.pregunta.clone(),
        sin_responder,
        conteo,
    }
}

pub(crate) fn compute_stats(invitados: &[Invitado], preguntas: &[Pregunta]) -> BodaStats {
    let confirmados = invitados.iter().filter(|i| i.confirmado == Some(true));
    let asistentes_confirmados: u32 = confirmados.clone().map(|i| 1 + i.num_acompanantes).sum();

    BodaStats {
        total_invitados: invitados.len(),
        confirmados: confirmados.count(),
        rechazados: invitados
            .iter()
            .filter(|i| i.confirmado == Some(false))
            .count(),
        pendientes: invitados.iter().filter(|i| i.confirmado.is_none()).count(),
        asistentes_confirmados,
        preguntas: preguntas
            .iter()
            .map(|p| pregunta_stats(p, invitados))
            .collect(),
    }
}

// GET /estadisticas/boda/:boda_id
pub async fn get_boda_stats<S>(
    State(state): State<AppState<S>>,
    Path(boda_id): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<BodaStats>>
where
    S: WeddingStore,
{
    ensure_manages(&identity, &boda_id)?;
    state.store.get_boda(&boda_id).await?;

    let invitados = state.store.get_invitados_by_boda(&boda_id).await?;
    let mut preguntas = state.store.get_preguntas_by_boda(&boda_id).await?;
    preguntas.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    Ok(Json(compute_stats(&invitados, &preguntas)))
}
