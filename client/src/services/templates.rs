use boda_shared::models::{Plantilla, PlantillaSlug};
use serde::{de::IgnoredAny, Deserialize, Serialize};

use crate::envelope::{Listing, Plantillas};
use crate::error::{ClientError, Result};
use crate::http::ApiClient;

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplate {
    pub boda_id: String,
    pub nombre: String,
    pub contenido: String,
    pub slug: PlantillaSlug,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct TemplateUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contenido: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<PlantillaSlug>,
}

#[derive(Deserialize)]
struct PlantillaEnvelope {
    plantilla: Plantilla,
}

#[derive(Deserialize)]
struct Rendered {
    mensaje: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderBody<'a> {
    invitado_id: &'a str,
}

#[derive(Clone)]
pub struct TemplatesService {
    api: ApiClient,
}

impl TemplatesService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, boda_id: &str) -> Result<Listing<Plantilla>> {
        let envelope: Plantillas<Plantilla> = self
            .api
            .get(&format!("/plantillas/boda/{}", boda_id))
            .await?;
        Ok(Listing::whole(envelope.plantillas))
    }

    pub async fn create(&self, plantilla: &NewTemplate) -> Result<Plantilla> {
        if plantilla.nombre.trim().is_empty() || plantilla.contenido.trim().is_empty() {
            return Err(ClientError::validation("Templates need a name and content"));
        }
        let envelope: PlantillaEnvelope = self.api.post("/plantillas", plantilla).await?;
        Ok(envelope.plantilla)
    }

    pub async fn update(&self, id: &str, update: &TemplateUpdate) -> Result<Plantilla> {
        let envelope: PlantillaEnvelope = self
            .api
            .put(&format!("/plantillas/{}", id), update)
            .await?;
        Ok(envelope.plantilla)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let _: IgnoredAny = self.api.delete(&format!("/plantillas/{}", id)).await?;
        Ok(())
    }

    /// The template rendered for one guest, magic link included.
    pub async fn render(&self, id: &str, invitado_id: &str) -> Result<String> {
        let rendered: Rendered = self
            .api
            .post(
                &format!("/plantillas/{}/render", id),
                &RenderBody { invitado_id },
            )
            .await?;
        Ok(rendered.mensaje)
    }
}
