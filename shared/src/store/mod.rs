use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Boda, Invitado, ListaDifusion, Plantilla, Pregunta, Usuario};

pub mod dynamo;

#[async_trait]
pub trait BodaStore: Send + Sync {
    async fn get_boda(&self, id: &str) -> Result<Boda>;
    async fn get_bodas(&self) -> Result<Vec<Boda>>;
    async fn create_boda(&self, boda: Boda) -> Result<Boda>;
    async fn update_boda(&self, boda: Boda) -> Result<Boda>;
}

#[async_trait]
pub trait InvitadoStore: Send + Sync {
    async fn get_invitado(&self, id: &str) -> Result<Invitado>;
    async fn get_invitados_by_boda(&self, boda_id: &str) -> Result<Vec<Invitado>>;
    async fn create_invitado(&self, invitado: Invitado) -> Result<Invitado>;
    async fn update_invitado(&self, invitado: Invitado) -> Result<Invitado>;
    async fn delete_invitado(&self, id: &str) -> Result<()>;
}

/// Questions are versioned: `update_pregunta` only succeeds when the stored
/// version equals `pregunta.version`, and stores it incremented.
#[async_trait]
pub trait PreguntaStore: Send + Sync {
    async fn get_pregunta(&self, id: &str) -> Result<Pregunta>;
    async fn get_preguntas_by_boda(&self, boda_id: &str) -> Result<Vec<Pregunta>>;
    async fn create_pregunta(&self, pregunta: Pregunta) -> Result<Pregunta>;
    async fn update_pregunta(&self, pregunta: Pregunta) -> Result<Pregunta>;
    async fn delete_pregunta(&self, id: &str) -> Result<()>;
}

/// Same version contract as [`PreguntaStore`].
#[async_trait]
pub trait ListaStore: Send + Sync {
    async fn get_lista(&self, id: &str) -> Result<ListaDifusion>;
    async fn get_listas_by_boda(&self, boda_id: &str) -> Result<Vec<ListaDifusion>>;
    async fn create_lista(&self, lista: ListaDifusion) -> Result<ListaDifusion>;
    async fn update_lista(&self, lista: ListaDifusion) -> Result<ListaDifusion>;
    async fn delete_lista(&self, id: &str) -> Result<()>;
}

#[async_trait]
pub trait PlantillaStore: Send + Sync {
    async fn get_plantilla(&self, id: &str) -> Result<Plantilla>;
    async fn get_plantillas_by_boda(&self, boda_id: &str) -> Result<Vec<Plantilla>>;
    async fn create_plantilla(&self, plantilla: Plantilla) -> Result<Plantilla>;
    async fn update_plantilla(&self, plantilla: Plantilla) -> Result<Plantilla>;
    async fn delete_plantilla(&self, id: &str) -> Result<()>;
}

#[async_trait]
pub trait UsuarioStore: Send + Sync {
    async fn get_usuario(&self, id: &str) -> Result<Usuario>;
    async fn get_usuario_by_email(&self, email: &str) -> Result<Usuario>;
    async fn get_usuarios(&self) -> Result<Vec<Usuario>>;
    async fn create_usuario(&self, usuario: Usuario) -> Result<Usuario>;
}

/// Everything the API needs from persistence.
pub trait WeddingStore:
    BodaStore + InvitadoStore + PreguntaStore + ListaStore + PlantillaStore + UsuarioStore + 'static
{
}

impl<T> WeddingStore for T where
    T: BodaStore
        + InvitadoStore
        + PreguntaStore
        + ListaStore
        + PlantillaStore
        + UsuarioStore
        + 'static
{
}
