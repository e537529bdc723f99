use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{Result, StoreError};
use crate::models::{Boda, Invitado, ListaDifusion, Plantilla, Pregunta, Usuario};
use crate::store::{BodaStore, InvitadoStore, ListaStore, PlantillaStore, PreguntaStore, UsuarioStore};

/// In-memory store with the same semantics as the DynamoDB one, including
/// create conflicts and version checks.
#[derive(Default)]
pub struct MockStore {
    bodas: Mutex<HashMap<String, Boda>>,
    invitados: Mutex<HashMap<String, Invitado>>,
    preguntas: Mutex<HashMap<String, Pregunta>>,
    listas: Mutex<HashMap<String, ListaDifusion>>,
    plantillas: Mutex<HashMap<String, Plantilla>>,
    usuarios: Mutex<HashMap<String, Usuario>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(m: &Mutex<T>) -> Result<std::sync::MutexGuard<'_, T>> {
    m.lock()
        .map_err(|_| StoreError::Internal("mock store lock poisoned".to_string()))
}

fn get<T: Clone>(map: &Mutex<HashMap<String, T>>, id: &str, what: &str) -> Result<T> {
    lock(map)?
        .get(id)
        .cloned()
        .ok_or_else(|| StoreError::NotFound(format!("{} {}", what, id)))
}

fn insert<T: Clone>(map: &Mutex<HashMap<String, T>>, id: &str, value: T, what: &str) -> Result<T> {
    let mut guard = lock(map)?;
    if guard.contains_key(id) {
        return Err(StoreError::Conflict(format!("{} already exists", what)));
    }
    guard.insert(id.to_string(), value.clone());
    Ok(value)
}

fn replace<T: Clone>(map: &Mutex<HashMap<String, T>>, id: &str, value: T, what: &str) -> Result<T> {
    let mut guard = lock(map)?;
    match guard.get_mut(id) {
        Some(existing) => {
            *existing = value.clone();
            Ok(value)
        }
        None => Err(StoreError::NotFound(format!("{} {}", what, id))),
    }
}

fn remove<T>(map: &Mutex<HashMap<String, T>>, id: &str, what: &str) -> Result<()> {
    lock(map)?
        .remove(id)
        .map(|_| ())
        .ok_or_else(|| StoreError::NotFound(format!("{} {}", what, id)))
}

fn by_boda<T: Clone>(map: &Mutex<HashMap<String, T>>, boda_of: impl Fn(&T) -> &str, boda_id: &str) -> Result<Vec<T>> {
    Ok(lock(map)?
        .values()
        .filter(|v| boda_of(v) == boda_id)
        .cloned()
        .collect())
}

#[async_trait]
impl BodaStore for MockStore {
    async fn get_boda(&self, id: &str) -> Result<Boda> {
        get(&self.bodas, id, "Boda")
    }

    async fn get_bodas(&self) -> Result<Vec<Boda>> {
        Ok(lock(&self.bodas)?.values().cloned().collect())
    }

    async fn create_boda(&self, boda: Boda) -> Result<Boda> {
        let id = boda.id.clone();
        insert(&self.bodas, &id, boda, "Boda")
    }

    async fn update_boda(&self, boda: Boda) -> Result<Boda> {
        let id = boda.id.clone();
        replace(&self.bodas, &id, boda, "Boda")
    }
}

#[async_trait]
impl InvitadoStore for MockStore {
    async fn get_invitado(&self, id: &str) -> Result<Invitado> {
        get(&self.invitados, id, "Invitado")
    }

    async fn get_invitados_by_boda(&self, boda_id: &str) -> Result<Vec<Invitado>> {
        by_boda(&self.invitados, |i| i.boda_id.as_str(), boda_id)
    }

    async fn create_invitado(&self, invitado: Invitado) -> Result<Invitado> {
        let id = invitado.id.clone();
        insert(&self.invitados, &id, invitado, "Invitado")
    }

    async fn update_invitado(&self, invitado: Invitado) -> Result<Invitado> {
        let id = invitado.id.clone();
        replace(&self.invitados, &id, invitado, "Invitado")
    }

    async fn delete_invitado(&self, id: &str) -> Result<()> {
        remove(&self.invitados, id, "Invitado")
    }
}

#[async_trait]
impl PreguntaStore for MockStore {
    async fn get_pregunta(&self, id: &str) -> Result<Pregunta> {
        get(&self.preguntas, id, "Pregunta")
    }

    async fn get_preguntas_by_boda(&self, boda_id: &str) -> Result<Vec<Pregunta>> {
        by_boda(&self.preguntas, |p| p.boda_id.as_str(), boda_id)
    }

    async fn create_pregunta(&self, pregunta: Pregunta) -> Result<Pregunta> {
        let id = pregunta.id.clone();
        insert(&self.preguntas, &id, pregunta, "Pregunta")
    }

    async fn update_pregunta(&self, mut pregunta: Pregunta) -> Result<Pregunta> {
        let mut guard = lock(&self.preguntas)?;
        let existing = guard
            .get_mut(&pregunta.id)
            .ok_or_else(|| StoreError::NotFound(format!("Pregunta {}", pregunta.id)))?;
        if existing.version != pregunta.version {
            return Err(StoreError::Conflict(format!(
                "Pregunta was modified since version {}",
                pregunta.version
            )));
        }
        pregunta.version += 1;
        *existing = pregunta.clone();
        Ok(pregunta)
    }

    async fn delete_pregunta(&self, id: &str) -> Result<()> {
        remove(&self.preguntas, id, "Pregunta")
    }
}

#[async_trait]
impl ListaStore for MockStore {
    async fn get_lista(&self, id: &str) -> Result<ListaDifusion> {
        get(&self.listas, id, "Lista")
    }

    async fn get_listas_by_boda(&self, boda_id: &str) -> Result<Vec<ListaDifusion>> {
        by_boda(&self.listas, |l| l.boda_id.as_str(), boda_id)
    }

    async fn create_lista(&self, lista: ListaDifusion) -> Result<ListaDifusion> {
        let id = lista.id.clone();
        insert(&self.listas, &id, lista, "Lista")
    }

    async fn update_lista(&self, mut lista: ListaDifusion) -> Result<ListaDifusion> {
        let mut guard = lock(&self.listas)?;
        let existing = guard
            .get_mut(&lista.id)
            .ok_or_else(|| StoreError::NotFound(format!("Lista {}", lista.id)))?;
        if existing.version != lista.version {
            return Err(StoreError::Conflict(format!(
                "Lista was modified since version {}",
                lista.version
            )));
        }
        lista.version += 1;
        *existing = lista.clone();
        Ok(lista)
    }

    async fn delete_lista(&self, id: &str) -> Result<()> {
        remove(&self.listas, id, "Lista")
    }
}

#[async_trait]
impl PlantillaStore for MockStore {
    async fn get_plantilla(&self, id: &str) -> Result<Plantilla> {
        get(&self.plantillas, id, "Plantilla")
    }

    async fn get_plantillas_by_boda(&self, boda_id: &str) -> Result<Vec<Plantilla>> {
        by_boda(&self.plantillas, |p| p.boda_id.as_str(), boda_id)
    }

    async fn create_plantilla(&self, plantilla: Plantilla) -> Result<Plantilla> {
        let id = plantilla.id.clone();
        insert(&self.plantillas, &id, plantilla, "Plantilla")
    }

    async fn update_plantilla(&self, plantilla: Plantilla) -> Result<Plantilla> {
        let id = plantilla.id.clone();
        replace(&self.plantillas, &id, plantilla, "Plantilla")
    }

    async fn delete_plantilla(&self, id: &str) -> Result<()> {
        remove(&self.plantillas, id, "Plantilla")
    }
}

#[async_trait]
impl UsuarioStore for MockStore {
    async fn get_usuario(&self, id: &str) -> Result<Usuario> {
        get(&self.usuarios, id, "Usuario")
    }

    async fn get_usuario_by_email(&self, email: &str) -> Result<Usuario> {
        let email = email.trim().to_lowercase();
        lock(&self.usuarios)?
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Usuario {}", email)))
    }

    async fn get_usuarios(&self) -> Result<Vec<Usuario>> {
        Ok(lock(&self.usuarios)?.values().cloned().collect())
    }

    async fn create_usuario(&self, usuario: Usuario) -> Result<Usuario> {
        let id = usuario.id.clone();
        insert(&self.usuarios, &id, usuario, "Usuario")
    }
}
