use boda_shared::models::InvitadoPor;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::http::ApiClient;

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvitationTarget {
    pub nombre: String,
    pub telefono: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invitado_por: Option<InvitadoPor>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SendInvitations {
    pub boda_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plantilla_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mensaje: Option<String>,
    pub invitados: Vec<InvitationTarget>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvitationResult {
    pub nombre: String,
    pub telefono: String,
    #[serde(default)]
    pub invitado_id: Option<String>,
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct InvitationReport {
    pub enviados: usize,
    pub fallidos: usize,
    pub resultados: Vec<InvitationResult>,
}

#[derive(Clone)]
pub struct InvitationsService {
    api: ApiClient,
}

impl InvitationsService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Server-side invitation run: missing guests are created and each one
    /// receives the rendered message with their own panel link.
    pub async fn send(&self, request: &SendInvitations) -> Result<InvitationReport> {
        if request.invitados.is_empty() {
            return Err(ClientError::validation("Add at least one guest to invite"));
        }
        let report: InvitationReport = self.api.post("/invitaciones/enviar", request).await?;
        info!(
            "Invitations sent: {} ok, {} failed",
            report.enviados, report.fallidos
        );
        Ok(report)
    }
}
