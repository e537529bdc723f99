use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::http::ApiClient;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionStats {
    pub pregunta_id: String,
    pub pregunta: String,
    #[serde(default)]
    pub sin_responder: usize,
    /// Answers per option.
    pub conteo: BTreeMap<String, usize>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeddingStats {
    pub total_invitados: usize,
    pub confirmados: usize,
    pub rechazados: usize,
    pub pendientes: usize,
    pub asistentes_confirmados: u32,
    #[serde(default)]
    pub preguntas: Vec<QuestionStats>,
}

#[derive(Clone)]
pub struct StatsService {
    api: ApiClient,
}

impl StatsService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn for_boda(&self, boda_id: &str) -> Result<WeddingStats> {
        self.api
            .get(&format!("/estadisticas/boda/{}", boda_id))
            .await
    }
}
