use boda_shared::models::Pregunta;
use log::info;
use serde::{de::IgnoredAny, Deserialize};

use crate::envelope::Listing;
use crate::error::Result;
use crate::http::ApiClient;
use crate::questions::{AssignTarget, QuestionInput};

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignSummary {
    pub asignados: usize,
    #[serde(default)]
    pub actualizados: usize,
    #[serde(default)]
    pub total: usize,
}

#[derive(Deserialize)]
struct PreguntaEnvelope {
    pregunta: Pregunta,
}

#[derive(Clone)]
pub struct QuestionsService {
    api: ApiClient,
}

impl QuestionsService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, boda_id: &str) -> Result<Listing<Pregunta>> {
        let preguntas: Vec<Pregunta> = self
            .api
            .get(&format!("/preguntas/boda/{}", boda_id))
            .await?;
        Ok(Listing::whole(preguntas))
    }

    pub async fn get(&self, id: &str) -> Result<Pregunta> {
        self.api.get(&format!("/preguntas/{}", id)).await
    }

    /// Creates or replaces a question. Invalid input never leaves the client.
    pub async fn save(&self, input: &QuestionInput) -> Result<Pregunta> {
        input.validate()?;
        let envelope: PreguntaEnvelope = match input {
            QuestionInput::Create(create) => self.api.post("/preguntas", create).await?,
            QuestionInput::Edit(edit) => {
                self.api
                    .put(&format!("/preguntas/{}", edit.id), edit)
                    .await?
            }
        };
        Ok(envelope.pregunta)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let _: IgnoredAny = self.api.delete(&format!("/preguntas/{}", id)).await?;
        Ok(())
    }

    pub async fn assign(&self, id: &str, target: &AssignTarget) -> Result<AssignSummary> {
        let summary: AssignSummary = self
            .api
            .post(&format!("/preguntas/{}/asignar", id), &target.body())
            .await?;
        info!(
            "Question {} assigned to {} new guests ({} refreshed)",
            id, summary.asignados, summary.actualizados
        );
        Ok(summary)
    }
}
