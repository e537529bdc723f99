use aws_lambda_events::event::cloudwatch_events::CloudWatchEvent;
use boda_shared::auth::{issue_token, Identity};
use boda_shared::models::{Boda, Invitado, PlantillaSlug, Rol};
use boda_shared::store::dynamo::DynamoStore;
use boda_shared::store::WeddingStore;
use boda_shared::template::{render, RenderContext};
use boda_shared::whatsapp::WhatsappClient;
use chrono::{Duration, NaiveDate, Utc};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use log::{error, info, warn};
use std::sync::Arc;

/// Days before the wedding on which pending guests are reminded
const REMINDER_1_DAYS: i64 = 30;
const REMINDER_2_DAYS: i64 = 14;
const REMINDER_3_DAYS: i64 = 7;

const DEFAULT_REMINDER: &str = "Hola {nombre}, todavía no has confirmado si vienes a la boda de {boda} el {fecha}. Puedes responder aquí: {enlace}";

#[derive(Debug, Clone)]
struct ReminderConfig {
    panel_base_url: String,
    guest_token_ttl_hours: i64,
}

impl ReminderConfig {
    fn from_env() -> Self {
        Self {
            panel_base_url: std::env::var("PANEL_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            guest_token_ttl_hours: std::env::var("GUEST_TOKEN_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(720),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting RSVP Reminder Service Lambda");

    let store = Arc::new(DynamoStore::new().await);
    let whatsapp = Arc::new(WhatsappClient::from_env());
    let config = Arc::new(ReminderConfig::from_env());

    lambda_runtime::run(service_fn(|event| {
        handler(event, store.clone(), whatsapp.clone(), config.clone())
    }))
    .await?;

    Ok(())
}

async fn handler<S: WeddingStore>(
    _event: LambdaEvent<CloudWatchEvent>,
    store: Arc<S>,
    whatsapp: Arc<WhatsappClient>,
    config: Arc<ReminderConfig>,
) -> Result<(), Error> {
    info!("Reminder service triggered");
    let sent = run_reminders(&*store, &whatsapp, &config, Utc::now().date_naive()).await?;
    info!("Reminder service completed, {} reminders sent", sent);
    Ok(())
}

async fn run_reminders<S: WeddingStore>(
    store: &S,
    whatsapp: &WhatsappClient,
    config: &ReminderConfig,
    today: NaiveDate,
) -> Result<usize, Error> {
    let bodas = store.get_bodas().await.map_err(|e| {
        error!("Failed to list weddings: {}", e);
        Error::from(format!("Failed to list weddings: {}", e))
    })?;
    info!("Checking {} weddings", bodas.len());

    let mut sent = 0;
    for boda in &bodas {
        match process_boda(store, whatsapp, config, boda, today).await {
            Ok(count) => sent += count,
            // One wedding failing must not stop the others
            Err(e) => error!("Failed to process wedding {}: {}", boda.id, e),
        }
    }
    Ok(sent)
}

async fn process_boda<S: WeddingStore>(
    store: &S,
    whatsapp: &WhatsappClient,
    config: &ReminderConfig,
    boda: &Boda,
    today: NaiveDate,
) -> Result<usize, String> {
    let Some(fecha) = boda.fecha else {
        warn!("Wedding {} has no date, skipping", boda.id);
        return Ok(0);
    };

    let days_until = (fecha - today).num_days();
    let reminder_number = determine_reminder_number(days_until);
    if reminder_number == 0 {
        return Ok(0);
    }

    let contenido = store
        .get_plantillas_by_boda(&boda.id)
        .await
        .map_err(|e| format!("Failed to load templates: {}", e))?
        .into_iter()
        .find(|p| p.slug == PlantillaSlug::Recordatorio)
        .map(|p| p.contenido)
        .unwrap_or_else(|| DEFAULT_REMINDER.to_string());

    let pendientes: Vec<Invitado> = store
        .get_invitados_by_boda(&boda.id)
        .await
        .map_err(|e| format!("Failed to load guests: {}", e))?
        .into_iter()
        .filter(|i| i.confirmado.is_none())
        .collect();

    info!(
        "Sending reminder {} for wedding {} ({} days left) to {} pending guests",
        reminder_number,
        boda.id,
        days_until,
        pendientes.len()
    );

    let mut sent = 0;
    for invitado in &pendientes {
        let enlace = match magic_link(config, invitado) {
            Ok(enlace) => enlace,
            Err(e) => {
                error!("Could not issue a link for guest {}: {}", invitado.id, e);
                continue;
            }
        };
        let mensaje = render(&contenido, &RenderContext::for_guest(invitado, boda, &enlace));

        match whatsapp.send(&invitado.telefono, &mensaje).await {
            Ok(_) => {
                info!("Sent reminder {} to guest {}", reminder_number, invitado.id);
                sent += 1;
            }
            Err(e) => error!("Failed to send reminder to guest {}: {}", invitado.id, e),
        }
    }

    Ok(sent)
}

fn magic_link(config: &ReminderConfig, invitado: &Invitado) -> Result<String, String> {
    let identity = Identity::new(&invitado.id, Rol::Invitado, Some(&invitado.boda_id));
    let token = issue_token(&identity, Duration::hours(config.guest_token_ttl_hours))
        .map_err(|e| e.to_string())?;
    Ok(format!(
        "{}/acceso?token={}",
        config.panel_base_url.trim_end_matches('/'),
        token
    ))
}

/// Which reminder, if any, is due with `days_until` days left.
///
/// The service runs once a day, so each reminder fires on exactly one day:
/// 1 at 30 days, 2 at 14 days, 3 at 7 days. Returns 0 on every other day,
/// including after the wedding.
fn determine_reminder_number(days_until: i64) -> u32 {
    match days_until {
        REMINDER_1_DAYS => 1,
        REMINDER_2_DAYS => 2,
        REMINDER_3_DAYS => 3,
        _ => 0,
    }
}
