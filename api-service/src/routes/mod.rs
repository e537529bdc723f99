use axum::{
    extract::{DefaultBodyLimit, Request},
    middleware,
    routing::{get, post, put},
    Router,
};
use log::{error, info, warn};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::handlers::{
    auth_handlers::{create_user, get_current_user, get_users, login, new_usuario},
    boda_handlers::{create_boda, get_boda, get_bodas, update_boda},
    guest_handlers::{
        create_guest, delete_guest, filter_guests, get_all_guests, get_guest, get_guests_page,
        get_magic_link, update_guest, update_guest_answers,
    },
    import_handlers::import_guests,
    invitation_handlers::send_invitations,
    lista_handlers::{create_lista, delete_lista, get_lista, get_listas, update_lista},
    panel_handlers::{get_me, update_me, update_my_answers},
    plantilla_handlers::{
        create_plantilla, delete_plantilla, get_plantillas, render_plantilla, update_plantilla,
    },
    pregunta_handlers::{
        assign_pregunta, create_pregunta, delete_pregunta, get_pregunta, get_preguntas,
        update_pregunta,
    },
    stats_handlers::get_boda_stats,
};
use crate::state::AppState;
use boda_shared::auth::auth_middleware;
use boda_shared::error::StoreError;
use boda_shared::models::Rol;
use boda_shared::store::{dynamo::DynamoStore, WeddingStore};
use boda_shared::test_utils::mock_store::MockStore;

/// Guest spreadsheets are small; keep uploads bounded.
const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Creates a router with the store selected by `config`.
pub async fn create_router(config: Config) -> Router {
    let prefix = config.route_prefix();
    info!("Using API route prefix: {}", prefix);

    if config.use_memory_store {
        info!("Creating router with in-memory store");
        let store = Arc::new(MockStore::new());
        seed_admin(&*store, &config).await;
        create_router_with_store(store, config, prefix)
    } else {
        info!("Creating router with DynamoDB store");
        let store = Arc::new(DynamoStore::new().await);
        seed_admin(&*store, &config).await;
        create_router_with_store(store, config, prefix)
    }
}

/// Creates the admin account from `ADMIN_EMAIL`/`ADMIN_PASSWORD` when it does not exist yet.
pub async fn seed_admin<S: WeddingStore>(store: &S, config: &Config) {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return;
    };

    match store.get_usuario_by_email(email).await {
        Ok(_) => info!("Admin account {} already exists", email),
        Err(StoreError::NotFound(_)) => {
            let admin = new_usuario("Administrador", email, password, Rol::Admin, None);
            match store.create_usuario(admin).await {
                Ok(created) => info!("Seeded admin account {}", created.email),
                Err(e) => error!("Failed to seed admin account: {}", e),
            }
        }
        Err(e) => error!("Could not look up admin account: {}", e),
    }
}

/// Creates a router with a given store implementation
pub fn create_router_with_store<S>(store: Arc<S>, config: Config, prefix: &str) -> Router
where
    S: WeddingStore + 'static,
{
    info!("Setting up API routes with prefix: '{}'", prefix);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    async fn logging_middleware(
        req: Request,
        next: axum::middleware::Next,
    ) -> impl axum::response::IntoResponse {
        info!(
            "Router received request: method={}, uri={}",
            req.method(),
            req.uri()
        );
        next.run(req).await
    }

    let state = AppState::new(store, config);

    let public_routes = Router::new().route("/auth/login", post(login::<S>));

    let protected_routes = Router::new()
        .route("/users/me", get(get_current_user::<S>))
        .route("/users", get(get_users::<S>).post(create_user::<S>))
        .route("/bodas", get(get_bodas::<S>).post(create_boda::<S>))
        .route("/bodas/:id", get(get_boda::<S>).patch(update_boda::<S>))
        // Guest self-service, registered before `/guests/:id`
        .route("/guests/me", get(get_me::<S>).patch(update_me::<S>))
        .route("/guests/me/respuestas", put(update_my_answers::<S>))
        .route("/guests", post(create_guest::<S>))
        .route("/guests/filtrar", post(filter_guests::<S>))
        .route("/guests/boda/:boda_id", get(get_guests_page::<S>))
        .route("/guests/boda/:boda_id/all", get(get_all_guests::<S>))
        .route(
            "/guests/import/:boda_id",
            post(import_guests::<S>).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/guests/:id",
            get(get_guest::<S>)
                .patch(update_guest::<S>)
                .delete(delete_guest::<S>),
        )
        .route("/guests/:id/respuestas", put(update_guest_answers::<S>))
        .route("/guests/:id/enlace", get(get_magic_link::<S>))
        .route("/preguntas", post(create_pregunta::<S>))
        .route("/preguntas/boda/:boda_id", get(get_preguntas::<S>))
        .route(
            "/preguntas/:id",
            get(get_pregunta::<S>)
                .put(update_pregunta::<S>)
                .delete(delete_pregunta::<S>),
        )
        .route("/preguntas/:id/asignar", post(assign_pregunta::<S>))
        .route("/lists", post(create_lista::<S>))
        .route("/lists/boda/:boda_id", get(get_listas::<S>))
        .route(
            "/lists/:id",
            get(get_lista::<S>)
                .put(update_lista::<S>)
                .delete(delete_lista::<S>),
        )
        .route("/plantillas", post(create_plantilla::<S>))
        .route("/plantillas/boda/:boda_id", get(get_plantillas::<S>))
        .route(
            "/plantillas/:id",
            put(update_plantilla::<S>).delete(delete_plantilla::<S>),
        )
        .route("/plantillas/:id/render", post(render_plantilla::<S>))
        .route("/invitaciones/enviar", post(send_invitations::<S>))
        .route("/estadisticas/boda/:boda_id", get(get_boda_stats::<S>))
        .layer(middleware::from_fn(auth_middleware));

    let api_routes = public_routes.merge(protected_routes).with_state(state);

    let router = if prefix.is_empty() {
        api_routes
            .layer(cors)
            .layer(middleware::from_fn(logging_middleware))
    } else {
        Router::new()
            .nest(prefix, api_routes)
            .layer(cors)
            .layer(middleware::from_fn(logging_middleware))
    };

    info!(
        "Router configured with all routes and middleware under prefix: '{}'",
        prefix
    );

    router.fallback(|req: Request| async move {
        warn!("No route matched for: {} {}", req.method(), req.uri());
        (
            axum::http::StatusCode::NOT_FOUND,
            "The requested resource was not found".to_string(),
        )
    })
}
