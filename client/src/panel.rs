//! The guest's own view: entered through a magic link, no password.

use boda_shared::models::{Invitado, Respuesta};
use boda_shared::text::fold;
use log::{info, warn};
use reqwest::Url;

use crate::error::{ClientError, Result};
use crate::services::guests::{AnswerInput, PanelBoda, PanelUpdate};
use crate::services::GuestsService;
use crate::session::{IdentityProvider, Session};

const TOKEN_PARAM: &str = "token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelRoute {
    Panel,
    InvalidLink,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicLink {
    pub route: PanelRoute,
    /// The link with the token removed, safe to keep in history.
    pub clean_url: String,
}

impl MagicLink {
    /// Persists the link's token as a guest session and strips it from the URL.
    pub fn consume(link: &str, identity: &IdentityProvider) -> Result<Self> {
        let mut url = match Url::parse(link) {
            Ok(url) => url,
            Err(e) => {
                warn!("Unparseable magic link: {}", e);
                return Ok(Self {
                    route: PanelRoute::InvalidLink,
                    clean_url: link.to_string(),
                });
            }
        };

        let mut token = None;
        let mut kept = Vec::new();
        for (key, value) in url.query_pairs() {
            if key == TOKEN_PARAM {
                token = Some(value.into_owned());
            } else {
                kept.push((key.into_owned(), value.into_owned()));
            }
        }

        url.set_query(None);
        if !kept.is_empty() {
            url.query_pairs_mut().extend_pairs(kept);
        }
        let clean_url = url.to_string();

        match token.filter(|t| !t.trim().is_empty()) {
            Some(token) => {
                identity.set(Session::guest(&token))?;
                info!("Guest session opened from magic link");
                Ok(Self {
                    route: PanelRoute::Panel,
                    clean_url,
                })
            }
            None => Ok(Self {
                route: PanelRoute::InvalidLink,
                clean_url,
            }),
        }
    }
}

/// One answer the guest is giving.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelAnswer {
    pub pregunta_id: String,
    pub respuesta: String,
    pub subrespuesta: Option<String>,
}

pub struct GuestPanel {
    guests: GuestsService,
    invitado: Option<Invitado>,
    boda: Option<PanelBoda>,
}

impl GuestPanel {
    pub fn new(guests: GuestsService) -> Self {
        Self {
            guests,
            invitado: None,
            boda: None,
        }
    }

    pub async fn load(&mut self) -> Result<&Invitado> {
        let view = self.guests.me().await?;
        self.boda = Some(view.boda);
        Ok(&*self.invitado.insert(view.invitado))
    }

    pub fn invitado(&self) -> Option<&Invitado> {
        self.invitado.as_ref()
    }

    pub fn boda(&self) -> Option<&PanelBoda> {
        self.boda.as_ref()
    }

    /// Checks the answers against the loaded questions, then submits them.
    pub async fn submit(&mut self, answers: &[PanelAnswer]) -> Result<&Invitado> {
        let invitado = self
            .invitado
            .as_ref()
            .ok_or_else(|| ClientError::validation("The panel is not loaded"))?;
        let input = check_answers(&invitado.respuestas, answers)?;

        let updated = self.guests.answer_me(&input).await?;
        Ok(&*self.invitado.insert(updated))
    }

    pub async fn update_attendance(
        &mut self,
        confirmado: Option<bool>,
        num_acompanantes: Option<u32>,
    ) -> Result<&Invitado> {
        let updated = self
            .guests
            .update_me(&PanelUpdate {
                confirmado: Some(confirmado),
                num_acompanantes,
            })
            .await?;
        Ok(&*self.invitado.insert(updated))
    }
}

/// Every required question needs an answer from its options, and a triggered
/// sub-question needs one of its own. Answers to non-required questions may
/// be omitted.
pub fn check_answers(asignadas: &[Respuesta], answers: &[PanelAnswer]) -> Result<Vec<AnswerInput>> {
    for answer in answers {
        if !asignadas.iter().any(|r| r.pregunta_id == answer.pregunta_id) {
            return Err(ClientError::validation(format!(
                "Question {} is not assigned to you",
                answer.pregunta_id
            )));
        }
    }

    let mut input = Vec::with_capacity(answers.len());
    for asignada in asignadas {
        let answer = answers
            .iter()
            .find(|a| a.pregunta_id == asignada.pregunta_id)
            .filter(|a| !a.respuesta.trim().is_empty());

        let Some(answer) = answer else {
            if asignada.obligatoria && asignada.respuesta.is_none() {
                return Err(ClientError::validation(format!(
                    "\"{}\" needs an answer",
                    asignada.pregunta
                )));
            }
            continue;
        };

        let respuesta = answer.respuesta.trim();
        if !has_option(&asignada.opciones, respuesta) {
            return Err(ClientError::validation(format!(
                "\"{}\" is not an option of \"{}\"",
                respuesta, asignada.pregunta
            )));
        }

        let subrespuesta = match &asignada.subpregunta {
            Some(sub) if sub.applies_to(respuesta) => {
                let given = answer
                    .subrespuesta
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| {
                        ClientError::validation(format!("\"{}\" needs an answer", sub.pregunta))
                    })?;
                if !has_option(&sub.opciones, given) {
                    return Err(ClientError::validation(format!(
                        "\"{}\" is not an option of \"{}\"",
                        given, sub.pregunta
                    )));
                }
                Some(given.to_string())
            }
            _ => None,
        };

        input.push(AnswerInput {
            pregunta_id: asignada.pregunta_id.clone(),
            respuesta: respuesta.to_string(),
            subrespuesta,
        });
    }

    Ok(input)
}

fn has_option(opciones: &[String], value: &str) -> bool {
    let wanted = fold(value);
    opciones.iter().any(|o| fold(o.trim()) == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use boda_shared::models::SubPregunta;

    fn asistencia() -> Respuesta {
        Respuesta {
            pregunta_id: "p-1".to_string(),
            pregunta: "¿Asistirás?".to_string(),
            opciones: vec!["Sí".to_string(), "No".to_string()],
            obligatoria: true,
            respuesta: None,
            subpregunta: Some(SubPregunta {
                pregunta: "¿Autobús?".to_string(),
                opciones: vec!["Ida".to_string(), "Ida y vuelta".to_string()],
                condicion: "si".to_string(),
            }),
            subrespuesta: None,
            asignada_at: None,
        }
    }

    fn answer(respuesta: &str, sub: Option<&str>) -> PanelAnswer {
        PanelAnswer {
            pregunta_id: "p-1".to_string(),
            respuesta: respuesta.to_string(),
            subrespuesta: sub.map(str::to_string),
        }
    }

    #[test]
    fn test_required_question_must_be_answered() {
        let err = check_answers(&[asistencia()], &[]).unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn test_triggered_subquestion_needs_answer() {
        assert!(check_answers(&[asistencia()], &[answer("Sí", None)]).is_err());
        assert!(check_answers(&[asistencia()], &[answer("Sí", Some("Nunca"))]).is_err());

        let input = check_answers(&[asistencia()], &[answer("Sí", Some("Ida"))]).unwrap();
        assert_eq!(input[0].subrespuesta.as_deref(), Some("Ida"));
    }

    #[test]
    fn test_untriggered_subquestion_is_dropped() {
        let input = check_answers(&[asistencia()], &[answer("No", Some("Ida"))]).unwrap();
        assert_eq!(input[0].respuesta, "No");
        assert!(input[0].subrespuesta.is_none());
    }

    #[test]
    fn test_unknown_option_or_question_is_rejected() {
        assert!(check_answers(&[asistencia()], &[answer("Quizás", None)]).is_err());

        let mut other = answer("Sí", Some("Ida"));
        other.pregunta_id = "p-otra".to_string();
        assert!(check_answers(&[asistencia()], &[other]).is_err());
    }

    #[test]
    fn test_consume_strips_token_and_persists_session() {
        let identity = IdentityProvider::in_memory();
        let link = MagicLink::consume(
            "https://panel.example.com/acceso?token=abc.def&lang=es",
            &identity,
        )
        .unwrap();

        assert_eq!(link.route, PanelRoute::Panel);
        assert_eq!(link.clean_url, "https://panel.example.com/acceso?lang=es");
        assert_eq!(identity.token().as_deref(), Some("abc.def"));
    }

    #[test]
    fn test_consume_without_token_is_invalid() {
        let identity = IdentityProvider::in_memory();
        let link = MagicLink::consume("https://panel.example.com/acceso", &identity).unwrap();
        assert_eq!(link.route, PanelRoute::InvalidLink);
        assert!(identity.get().is_none());

        let link = MagicLink::consume("not a url", &identity).unwrap();
        assert_eq!(link.route, PanelRoute::InvalidLink);
    }
}
