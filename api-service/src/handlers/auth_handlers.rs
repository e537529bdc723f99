use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use boda_shared::auth::{hash_password, issue_token, verify_password, Identity};
use boda_shared::error::StoreError;
use boda_shared::models::{now_str, Rol, Usuario, UsuarioPublico};
use boda_shared::store::WeddingStore;
use chrono::Duration;
use log::{info, warn};

use super::ensure_admin;
use crate::error::{AppError, Result};
use crate::models::{CreateUserRequest, LoginRequest, LoginResponse};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

// POST /auth/login
pub async fn login<S>(
    State(state): State<AppState<S>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>>
where
    S: WeddingStore,
{
    let email = payload.email.trim().to_lowercase();
    let usuario = match state.store.get_usuario_by_email(&email).await {
        Ok(usuario) => usuario,
        Err(StoreError::NotFound(_)) => {
            warn!("Login attempt for unknown email {}", email);
            return Err(AppError::unauthorized(INVALID_CREDENTIALS.into()));
        }
        Err(e) => return Err(e.into()),
    };

    if !verify_password(&payload.password, &usuario.salt, &usuario.password_hash) {
        warn!("Wrong password for {}", email);
        return Err(AppError::unauthorized(INVALID_CREDENTIALS.into()));
    }

    let identity = Identity::new(&usuario.id, usuario.tipo_usuario, usuario.boda_id.as_deref());
    let token = issue_token(
        &identity,
        Duration::hours(state.config.user_token_ttl_hours),
    )?;
    info!("User {} logged in as {}", usuario.id, usuario.tipo_usuario);

    Ok(Json(LoginResponse {
        token,
        usuario: usuario.into(),
    }))
}

// GET /users/me
pub async fn get_current_user<S>(
    State(state): State<AppState<S>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<serde_json::Value>>
where
    S: WeddingStore,
{
    if identity.rol == Rol::Invitado {
        return Err(AppError::forbidden("Guests have no user account".into()));
    }
    let usuario: UsuarioPublico = state.store.get_usuario(&identity.user_id).await?.into();
    Ok(Json(serde_json::json!({ "usuario": usuario })))
}

// GET /users
pub async fn get_users<S>(
    State(state): State<AppState<S>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<serde_json::Value>>
where
    S: WeddingStore,
{
    ensure_admin(&identity)?;

    let mut usuarios: Vec<UsuarioPublico> = state
        .store
        .get_usuarios()
        .await?
        .into_iter()
        .map(UsuarioPublico::from)
        .collect();
    usuarios.sort_by(|a, b| a.nombre.cmp(&b.nombre));

    Ok(Json(serde_json::json!({ "usuarios": usuarios })))
}

/// Builds a stored user with a fresh salt. Shared with the start-up admin seeding.
pub(crate) fn new_usuario(
    nombre: &str,
    email: &str,
    password: &str,
    tipo_usuario: Rol,
    boda_id: Option<String>,
) -> Usuario {
    let salt = uuid::Uuid::new_v4().to_string();
    Usuario {
        id: uuid::Uuid::new_v4().to_string(),
        nombre: nombre.trim().to_string(),
        email: email.trim().to_lowercase(),
        tipo_usuario,
        boda_id,
        password_hash: hash_password(password, &salt),
        salt,
        created_at: now_str(),
    }
}

// POST /users
pub async fn create_user<S>(
    State(state): State<AppState<S>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)>
where
    S: WeddingStore,
{
    ensure_admin(&identity)?;

    if payload.nombre.trim().is_empty() || !payload.email.contains('@') {
        return Err(AppError::bad_request(
            "A name and a valid email are required".into(),
        ));
    }
    if payload.password.len() < 6 {
        return Err(AppError::bad_request(
            "Password must have at least 6 characters".into(),
        ));
    }

    let boda_id = match payload.tipo_usuario {
        Rol::Admin => None,
        Rol::Novio => {
            let boda_id = payload
                .boda_id
                .filter(|b| !b.is_empty())
                .ok_or_else(|| AppError::bad_request("bodaId is required for a couple".into()))?;
            state.store.get_boda(&boda_id).await?;
            Some(boda_id)
        }
        Rol::Invitado => {
            return Err(AppError::bad_request(
                "Guests are not user accounts".into(),
            ))
        }
    };

    match state.store.get_usuario_by_email(&payload.email).await {
        Ok(_) => {
            return Err(AppError::conflict(format!(
                "A user with email {} already exists",
                payload.email.trim().to_lowercase()
            )))
        }
        Err(StoreError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    let usuario = new_usuario(
        &payload.nombre,
        &payload.email,
        &payload.password,
        payload.tipo_usuario,
        boda_id,
    );
    let created: UsuarioPublico = state.store.create_usuario(usuario).await?.into();
    info!("Created {} user {}", created.tipo_usuario, created.id);

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "usuario": created })),
    ))
}
