use boda_shared::models::{Invitado, InvitadoPor};
use chrono::NaiveDate;
use log::info;
use serde::{de::IgnoredAny, Deserialize, Serialize};

use crate::envelope::{GuestPage, Invitados, Listing};
use crate::error::{ClientError, Result};
use crate::http::ApiClient;

/// Page size used when the caller does not pick one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewGuest {
    pub boda_id: String,
    pub nombre: String,
    pub telefono: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invitado_por: Option<InvitadoPor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_acompanantes: Option<u32>,
}

/// Partial edit of a guest. `Some(None)` sends an explicit null.
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GuestUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invitado_por: Option<Option<InvitadoPor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmado: Option<Option<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_acompanantes: Option<u32>,
}

/// What a guest may change about themselves.
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PanelUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmado: Option<Option<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_acompanantes: Option<u32>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnswerInput {
    pub pregunta_id: String,
    pub respuesta: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subrespuesta: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct MagicLinkInfo {
    pub enlace: String,
    pub token: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct DuplicateGuest {
    pub nombre: String,
    pub telefono: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RowError {
    pub fila: usize,
    pub motivo: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ImportReport {
    pub creados: Vec<Invitado>,
    #[serde(default)]
    pub duplicados: Vec<DuplicateGuest>,
    #[serde(default)]
    pub errores: Vec<RowError>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PanelBoda {
    pub nombre: String,
    #[serde(default)]
    pub fecha: Option<NaiveDate>,
    #[serde(default)]
    pub ubicacion: Option<String>,
    #[serde(default)]
    pub detalles: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PanelView {
    pub invitado: Invitado,
    pub boda: PanelBoda,
}

#[derive(Deserialize)]
struct InvitadoEnvelope {
    invitado: Invitado,
}

#[derive(Serialize)]
struct PageParams<'a> {
    page: usize,
    limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FilterBody<'a> {
    boda_id: &'a str,
    pregunta_id: &'a str,
    respuesta: &'a str,
}

#[derive(Serialize)]
struct AnswersBody<'a> {
    respuestas: &'a [AnswerInput],
}

#[derive(Clone)]
pub struct GuestsService {
    api: ApiClient,
}

impl GuestsService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn page(
        &self,
        boda_id: &str,
        page: usize,
        limit: usize,
        search: Option<&str>,
    ) -> Result<Listing<Invitado>> {
        let params = PageParams {
            page: page.max(1),
            limit,
            search: search.map(str::trim).filter(|s| !s.is_empty()),
        };
        let envelope: GuestPage<Invitado> = self
            .api
            .get_query(&format!("/guests/boda/{}", boda_id), &params)
            .await?;
        Ok(envelope.into())
    }

    pub async fn all(&self, boda_id: &str) -> Result<Listing<Invitado>> {
        let invitados: Vec<Invitado> = self
            .api
            .get(&format!("/guests/boda/{}/all", boda_id))
            .await?;
        Ok(Listing::whole(invitados))
    }

    pub async fn get(&self, id: &str) -> Result<Invitado> {
        let envelope: InvitadoEnvelope = self.api.get(&format!("/guests/{}", id)).await?;
        Ok(envelope.invitado)
    }

    pub async fn create(&self, guest: &NewGuest) -> Result<Invitado> {
        if guest.nombre.trim().is_empty() || guest.telefono.trim().is_empty() {
            return Err(ClientError::validation("Name and phone are required"));
        }
        let envelope: InvitadoEnvelope = self.api.post("/guests", guest).await?;
        Ok(envelope.invitado)
    }

    pub async fn update(&self, id: &str, update: &GuestUpdate) -> Result<Invitado> {
        let envelope: InvitadoEnvelope =
            self.api.patch(&format!("/guests/{}", id), update).await?;
        Ok(envelope.invitado)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let _: IgnoredAny = self.api.delete(&format!("/guests/{}", id)).await?;
        Ok(())
    }

    /// Guests whose answer to `pregunta_id` equals `respuesta`.
    pub async fn filter(
        &self,
        boda_id: &str,
        pregunta_id: &str,
        respuesta: &str,
    ) -> Result<Listing<Invitado>> {
        let envelope: Invitados<Invitado> = self
            .api
            .post(
                "/guests/filtrar",
                &FilterBody {
                    boda_id,
                    pregunta_id,
                    respuesta,
                },
            )
            .await?;
        Ok(Listing::whole(envelope.invitados))
    }

    pub async fn update_answers(&self, id: &str, respuestas: &[AnswerInput]) -> Result<Invitado> {
        let envelope: InvitadoEnvelope = self
            .api
            .put(
                &format!("/guests/{}/respuestas", id),
                &AnswersBody { respuestas },
            )
            .await?;
        Ok(envelope.invitado)
    }

    pub async fn magic_link(&self, id: &str) -> Result<MagicLinkInfo> {
        self.api.get(&format!("/guests/{}/enlace", id)).await
    }

    /// The signed-in guest and their wedding.
    pub async fn me(&self) -> Result<PanelView> {
        self.api.get("/guests/me").await
    }

    pub async fn update_me(&self, update: &PanelUpdate) -> Result<Invitado> {
        let envelope: InvitadoEnvelope = self.api.patch("/guests/me", update).await?;
        Ok(envelope.invitado)
    }

    pub async fn answer_me(&self, respuestas: &[AnswerInput]) -> Result<Invitado> {
        let envelope: InvitadoEnvelope = self
            .api
            .put("/guests/me/respuestas", &AnswersBody { respuestas })
            .await?;
        Ok(envelope.invitado)
    }

    /// Uploads a CSV guest sheet.
    pub async fn import(&self, boda_id: &str, file_name: &str, bytes: Vec<u8>) -> Result<ImportReport> {
        if bytes.is_empty() {
            return Err(ClientError::validation("The file is empty"));
        }
        let report: ImportReport = self
            .api
            .post_file(&format!("/guests/import/{}", boda_id), "file", file_name, bytes)
            .await?;
        info!(
            "Import finished: {} created, {} duplicates, {} errors",
            report.creados.len(),
            report.duplicados.len(),
            report.errores.len()
        );
        Ok(report)
    }
}
