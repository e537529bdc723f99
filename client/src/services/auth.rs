use boda_shared::models::{Rol, UsuarioPublico};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::http::ApiClient;
use crate::session::Session;

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
    usuario: UsuarioPublico,
}

#[derive(Deserialize)]
struct UsuarioEnvelope {
    usuario: UsuarioPublico,
}

#[derive(Deserialize)]
struct UsuariosEnvelope {
    usuarios: Vec<UsuarioPublico>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub nombre: String,
    pub email: String,
    pub password: String,
    pub tipo_usuario: Rol,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boda_id: Option<String>,
}

#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Logs in and stores the session in the identity provider.
    pub async fn login(&self, email: &str, password: &str) -> Result<UsuarioPublico> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ClientError::validation("Email and password are required"));
        }

        let response: LoginResponse = self
            .api
            .post("/auth/login", &LoginRequest { email, password })
            .await?;

        info!("Logged in as {}", response.usuario.nombre);
        self.api.identity().set(Session {
            token: response.token,
            usuario: Some(response.usuario.clone()),
        })?;
        Ok(response.usuario)
    }

    pub fn logout(&self) -> Result<()> {
        self.api.identity().clear()
    }

    pub async fn me(&self) -> Result<UsuarioPublico> {
        let envelope: UsuarioEnvelope = self.api.get("/users/me").await?;
        Ok(envelope.usuario)
    }

    pub async fn users(&self) -> Result<Vec<UsuarioPublico>> {
        let envelope: UsuariosEnvelope = self.api.get("/users").await?;
        Ok(envelope.usuarios)
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<UsuarioPublico> {
        let envelope: UsuarioEnvelope = self.api.post("/users", user).await?;
        Ok(envelope.usuario)
    }
}
