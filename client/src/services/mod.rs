//! One service per REST resource. Each unwraps its endpoint's envelope so
//! callers only ever see models or [`Listing`](crate::envelope::Listing)s.

pub mod auth;
pub mod bodas;
pub mod guests;
pub mod invitations;
pub mod lists;
pub mod questions;
pub mod stats;
pub mod templates;

pub use auth::AuthService;
pub use bodas::BodasService;
pub use guests::GuestsService;
pub use invitations::InvitationsService;
pub use lists::ListsService;
pub use questions::QuestionsService;
pub use stats::StatsService;
pub use templates::TemplatesService;

use crate::http::ApiClient;

/// Every resource service over one shared client.
#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub bodas: BodasService,
    pub guests: GuestsService,
    pub questions: QuestionsService,
    pub lists: ListsService,
    pub templates: TemplatesService,
    pub invitations: InvitationsService,
    pub stats: StatsService,
}

impl Services {
    pub fn new(api: ApiClient) -> Self {
        Self {
            auth: AuthService::new(api.clone()),
            bodas: BodasService::new(api.clone()),
            guests: GuestsService::new(api.clone()),
            questions: QuestionsService::new(api.clone()),
            lists: ListsService::new(api.clone()),
            templates: TemplatesService::new(api.clone()),
            invitations: InvitationsService::new(api.clone()),
            stats: StatsService::new(api),
        }
    }
}
