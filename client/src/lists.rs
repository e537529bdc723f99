//! Broadcast lists as the dashboard holds them: the server is the source of
//! truth and every successful call is mirrored into the local copy.

use boda_shared::models::{ListaDifusion, MIN_NOMBRE_LISTA};
use log::{info, warn};

use crate::error::{ClientError, Result};
use crate::services::lists::{ListReplacement, NewList};
use crate::services::ListsService;

/// Trims the name, drops blank and repeated member ids, and checks both.
pub fn validate_list(nombre: &str, invitados: &[String]) -> Result<(String, Vec<String>)> {
    let nombre = nombre.trim();
    if nombre.chars().count() < MIN_NOMBRE_LISTA {
        return Err(ClientError::validation(format!(
            "List names need at least {} characters",
            MIN_NOMBRE_LISTA
        )));
    }

    let mut miembros: Vec<String> = Vec::with_capacity(invitados.len());
    for id in invitados.iter().map(|id| id.trim()).filter(|id| !id.is_empty()) {
        if !miembros.iter().any(|m| m == id) {
            miembros.push(id.to_string());
        }
    }
    if miembros.is_empty() {
        return Err(ClientError::validation("Select at least one guest"));
    }

    Ok((nombre.to_string(), miembros))
}

pub struct ListManager {
    service: ListsService,
    boda_id: String,
    listas: Vec<ListaDifusion>,
}

impl ListManager {
    pub fn new(service: ListsService, boda_id: &str) -> Self {
        Self {
            service,
            boda_id: boda_id.to_string(),
            listas: vec![],
        }
    }

    pub async fn load(&mut self) -> Result<&[ListaDifusion]> {
        self.listas = self.service.list(&self.boda_id).await?.data;
        Ok(&self.listas)
    }

    pub fn listas(&self) -> &[ListaDifusion] {
        &self.listas
    }

    pub fn get(&self, id: &str) -> Option<&ListaDifusion> {
        self.listas.iter().find(|l| l.id == id)
    }

    pub async fn create(&mut self, nombre: &str, invitados: &[String]) -> Result<ListaDifusion> {
        let (nombre, invitados) = validate_list(nombre, invitados).map_err(|e| {
            warn!("List rejected locally: {}", e);
            e
        })?;

        let created = self
            .service
            .create(&NewList {
                boda_id: self.boda_id.clone(),
                nombre,
                invitados,
            })
            .await?;
        info!("Created list {} with {} guests", created.nombre, created.invitados.len());
        self.listas.push(created.clone());
        Ok(created)
    }

    /// Replaces name and membership. Sends the version of the local copy so a
    /// concurrent edit surfaces as a 409.
    pub async fn edit(&mut self, id: &str, nombre: &str, invitados: &[String]) -> Result<ListaDifusion> {
        let (nombre, invitados) = validate_list(nombre, invitados)?;
        let version = self.get(id).map(|l| l.version);

        let updated = self
            .service
            .replace(
                id,
                &ListReplacement {
                    nombre,
                    invitados,
                    version,
                },
            )
            .await?;

        match self.listas.iter_mut().find(|l| l.id == id) {
            Some(local) => *local = updated.clone(),
            None => self.listas.push(updated.clone()),
        }
        Ok(updated)
    }

    pub async fn delete(&mut self, id: &str) -> Result<()> {
        self.service.delete(id).await?;
        self.listas.retain(|l| l.id != id);
        Ok(())
    }
}
