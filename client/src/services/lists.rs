use boda_shared::models::ListaDifusion;
use serde::{de::IgnoredAny, Deserialize, Serialize};

use crate::envelope::{Listas, Listing};
use crate::error::Result;
use crate::http::ApiClient;

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewList {
    pub boda_id: String,
    pub nombre: String,
    pub invitados: Vec<String>,
}

/// Replaces both name and membership.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ListReplacement {
    pub nombre: String,
    pub invitados: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

#[derive(Deserialize)]
struct ListaEnvelope {
    lista: ListaDifusion,
}

#[derive(Clone)]
pub struct ListsService {
    api: ApiClient,
}

impl ListsService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, boda_id: &str) -> Result<Listing<ListaDifusion>> {
        let envelope: Listas<ListaDifusion> =
            self.api.get(&format!("/lists/boda/{}", boda_id)).await?;
        Ok(Listing::whole(envelope.listas))
    }

    pub async fn get(&self, id: &str) -> Result<ListaDifusion> {
        let envelope: ListaEnvelope = self.api.get(&format!("/lists/{}", id)).await?;
        Ok(envelope.lista)
    }

    pub async fn create(&self, lista: &NewList) -> Result<ListaDifusion> {
        let envelope: ListaEnvelope = self.api.post("/lists", lista).await?;
        Ok(envelope.lista)
    }

    pub async fn replace(&self, id: &str, lista: &ListReplacement) -> Result<ListaDifusion> {
        let envelope: ListaEnvelope = self.api.put(&format!("/lists/{}", id), lista).await?;
        Ok(envelope.lista)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let _: IgnoredAny = self.api.delete(&format!("/lists/{}", id)).await?;
        Ok(())
    }
}
