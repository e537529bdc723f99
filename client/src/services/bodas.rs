use boda_shared::models::Boda;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::envelope::{Bodas, Listing};
use crate::error::{ClientError, Result};
use crate::http::ApiClient;

#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewBoda {
    pub nombre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ubicacion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono_contacto: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detalles: Option<String>,
}

/// Partial edit. The outer `None` leaves a field alone; `Some(None)` clears it.
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct BodaUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ubicacion: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono_contacto: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detalles: Option<Option<String>>,
}

#[derive(Deserialize)]
struct BodaEnvelope {
    boda: Boda,
}

#[derive(Clone)]
pub struct BodasService {
    api: ApiClient,
}

impl BodasService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Listing<Boda>> {
        let envelope: Bodas<Boda> = self.api.get("/bodas").await?;
        Ok(Listing::whole(envelope.bodas))
    }

    pub async fn get(&self, id: &str) -> Result<Boda> {
        let envelope: BodaEnvelope = self.api.get(&format!("/bodas/{}", id)).await?;
        Ok(envelope.boda)
    }

    pub async fn create(&self, boda: &NewBoda) -> Result<Boda> {
        if boda.nombre.trim().is_empty() {
            return Err(ClientError::validation("The wedding needs a name"));
        }
        let envelope: BodaEnvelope = self.api.post("/bodas", boda).await?;
        Ok(envelope.boda)
    }

    pub async fn update(&self, id: &str, update: &BodaUpdate) -> Result<Boda> {
        let envelope: BodaEnvelope = self.api.patch(&format!("/bodas/{}", id), update).await?;
        Ok(envelope.boda)
    }
}
