use boda_shared::models::{Boda, Invitado, ListaDifusion, Plantilla};
use boda_shared::phone::normalize_phone;
use boda_shared::template::{render, RenderContext};
use boda_shared::whatsapp::{BroadcastTarget, WhatsappClient};
use log::{error, info, warn};
use std::collections::HashSet;

use crate::error::{ClientError, Result};
use crate::services::GuestsService;
use crate::whatsapp::SessionState;

#[derive(Debug, Clone, PartialEq)]
pub enum MessageBody {
    /// Plain text, sent as is.
    Direct(String),
    /// Rendered per guest.
    Template(Plantilla),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Recipients {
    Guests(Vec<Invitado>),
    Lists(Vec<ListaDifusion>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipientOutcome {
    pub invitado_id: String,
    pub nombre: String,
    /// Normalized number, or the raw one when it could not be normalized.
    pub telefono: String,
    pub ok: bool,
    pub error: Option<String>,
}

impl RecipientOutcome {
    fn sent(invitado: &Invitado, telefono: &str) -> Self {
        Self {
            invitado_id: invitado.id.clone(),
            nombre: invitado.nombre.clone(),
            telefono: telefono.to_string(),
            ok: true,
            error: None,
        }
    }

    fn failed(invitado: &Invitado, telefono: &str, error: impl Into<String>) -> Self {
        Self {
            invitado_id: invitado.id.clone(),
            nombre: invitado.nombre.clone(),
            telefono: telefono.to_string(),
            ok: false,
            error: Some(error.into()),
        }
    }
}

/// Sends messages straight through the WhatsApp service.
pub struct Composer {
    whatsapp: WhatsappClient,
    guests: GuestsService,
    boda: Boda,
    default_cc: String,
}

impl Composer {
    pub fn new(whatsapp: WhatsappClient, guests: GuestsService, boda: Boda, default_cc: &str) -> Self {
        Self {
            whatsapp,
            guests,
            boda,
            default_cc: default_cc.to_string(),
        }
    }

    /// Sends `body` to `recipients`. List members are looked up in `everyone`.
    ///
    /// Nothing is sent unless `session` is connected. Guests with unusable
    /// numbers get a failed outcome; in list mode, having no usable number at
    /// all aborts before any request.
    pub async fn send(
        &self,
        session: &SessionState,
        body: &MessageBody,
        recipients: &Recipients,
        everyone: &[Invitado],
    ) -> Result<Vec<RecipientOutcome>> {
        if !session.can_send() {
            warn!("Refusing to send: WhatsApp session is {:?}", session);
            return Err(ClientError::NotConnected);
        }

        let contenido = match body {
            MessageBody::Direct(text) => text,
            MessageBody::Template(plantilla) => &plantilla.contenido,
        };
        if contenido.trim().is_empty() {
            return Err(ClientError::validation("The message is empty"));
        }

        let targets = resolve(recipients, everyone);
        if targets.is_empty() {
            return Err(ClientError::validation("Choose at least one recipient"));
        }

        let mut outcomes = Vec::with_capacity(targets.len());
        let mut valid: Vec<(&Invitado, String)> = Vec::with_capacity(targets.len());
        for invitado in targets {
            match normalize_phone(&invitado.telefono, &self.default_cc) {
                Some(telefono) => valid.push((invitado, telefono)),
                None => outcomes.push(RecipientOutcome::failed(
                    invitado,
                    &invitado.telefono,
                    "Invalid phone number",
                )),
            }
        }

        if valid.is_empty() && matches!(recipients, Recipients::Lists(_)) {
            return Err(ClientError::validation(
                "None of the selected lists has a valid phone number",
            ));
        }

        match (body, recipients) {
            (MessageBody::Direct(text), Recipients::Lists(_)) => {
                let telefonos: Vec<String> = valid.iter().map(|(_, t)| t.clone()).collect();
                let sent = self
                    .whatsapp
                    .broadcast(&BroadcastTarget::Telefonos(telefonos), text)
                    .await;
                for (invitado, telefono) in &valid {
                    outcomes.push(match &sent {
                        Ok(_) => RecipientOutcome::sent(invitado, telefono),
                        Err(e) => RecipientOutcome::failed(invitado, telefono, e.to_string()),
                    });
                }
            }
            _ => {
                for (invitado, telefono) in &valid {
                    outcomes.push(self.send_one(body, invitado, telefono).await);
                }
            }
        }

        let ok = outcomes.iter().filter(|o| o.ok).count();
        info!("Sent {} of {} messages", ok, outcomes.len());
        Ok(outcomes)
    }

    async fn send_one(&self, body: &MessageBody, invitado: &Invitado, telefono: &str) -> RecipientOutcome {
        let mensaje = match body {
            MessageBody::Direct(text) => text.clone(),
            MessageBody::Template(plantilla) => match self.render_for(plantilla, invitado).await {
                Ok(mensaje) => mensaje,
                Err(e) => return RecipientOutcome::failed(invitado, telefono, e.to_string()),
            },
        };

        match self.whatsapp.send(telefono, &mensaje).await {
            Ok(_) => RecipientOutcome::sent(invitado, telefono),
            Err(e) => {
                error!("Failed to send to {}: {}", telefono, e);
                RecipientOutcome::failed(invitado, telefono, e.to_string())
            }
        }
    }

    /// Only fetches the guest's magic link when the template uses it.
    async fn render_for(&self, plantilla: &Plantilla, invitado: &Invitado) -> Result<String> {
        let enlace = if plantilla.contenido.contains("{enlace}") {
            self.guests.magic_link(&invitado.id).await?.enlace
        } else {
            String::new()
        };
        let ctx = RenderContext::for_guest(invitado, &self.boda, &enlace);
        Ok(render(&plantilla.contenido, &ctx))
    }
}

/// Recipients in order, each guest at most once.
fn resolve<'a>(recipients: &'a Recipients, everyone: &'a [Invitado]) -> Vec<&'a Invitado> {
    let mut seen: HashSet<&'a str> = HashSet::new();
    match recipients {
        Recipients::Guests(guests) => guests.iter().filter(|&g| seen.insert(g.id.as_str())).collect(),
        Recipients::Lists(listas) => listas
            .iter()
            .flat_map(|l| l.invitados.iter())
            .filter_map(|id| everyone.iter().find(|g| &g.id == id))
            .filter(|&g| seen.insert(g.id.as_str()))
            .collect(),
    }
}
