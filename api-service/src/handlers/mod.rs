use boda_shared::auth::{issue_token, Identity};
use boda_shared::models::{Invitado, Rol};
use boda_shared::text::fold;
use chrono::Duration;

use crate::config::Config;
use crate::error::{AppError, Result};

pub mod auth_handlers;
pub mod boda_handlers;
pub mod guest_handlers;
pub mod import_handlers;
pub mod invitation_handlers;
pub mod lista_handlers;
pub mod panel_handlers;
pub mod plantilla_handlers;
pub mod pregunta_handlers;
pub mod stats_handlers;

/// Rejects callers that may not manage the given wedding.
pub(crate) fn ensure_manages(identity: &Identity, boda_id: &str) -> Result<()> {
    if identity.can_manage(boda_id) {
        Ok(())
    } else {
        Err(AppError::forbidden(
            "You don't have permission to manage this wedding".into(),
        ))
    }
}

pub(crate) fn ensure_admin(identity: &Identity) -> Result<()> {
    if identity.is_admin() {
        Ok(())
    } else {
        Err(AppError::forbidden("Only administrators can do this".into()))
    }
}

/// Issues a guest token and builds the panel link that carries it.
pub(crate) fn magic_link(config: &Config, invitado: &Invitado) -> Result<(String, String)> {
    let identity = Identity::new(&invitado.id, Rol::Invitado, Some(&invitado.boda_id));
    let token = issue_token(&identity, Duration::hours(config.guest_token_ttl_hours))?;
    let enlace = format!(
        "{}/acceso?token={}",
        config.panel_base_url.trim_end_matches('/'),
        token
    );
    Ok((enlace, token))
}

pub(crate) fn sort_by_nombre(invitados: &mut [Invitado]) {
    invitados.sort_by_cached_key(|i| fold(&i.nombre));
}
