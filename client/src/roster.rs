use boda_shared::models::{Invitado, ListaDifusion, Pregunta};
use boda_shared::text::matches_guest;
use log::{debug, error, info};

use crate::envelope::{ListMeta, Listing};
use crate::error::{ClientError, Result};
use crate::lists::ListManager;
use crate::services::guests::DEFAULT_PAGE_SIZE;
use crate::services::GuestsService;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RosterState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error(String),
}

/// Something to tell the user about the current view that is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterNotice {
    NoMatches,
}

/// An active "answered X to question Y" filter.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerFilter {
    pub pregunta_id: String,
    pub pregunta: String,
    pub opcion: String,
}

impl AnswerFilter {
    /// Both a question and one of its options must be picked.
    pub fn select(pregunta: Option<&Pregunta>, opcion: Option<&str>) -> Result<Self> {
        let pregunta =
            pregunta.ok_or_else(|| ClientError::validation("Choose a question to filter by"))?;
        let opcion = opcion
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .ok_or_else(|| ClientError::validation("Choose an answer to filter by"))?;
        if !pregunta.has_option(opcion) {
            return Err(ClientError::validation(format!(
                "\"{}\" is not an option of \"{}\"",
                opcion, pregunta.pregunta
            )));
        }

        Ok(Self {
            pregunta_id: pregunta.id.clone(),
            pregunta: pregunta.pregunta.clone(),
            opcion: opcion.to_string(),
        })
    }

    pub fn list_name(&self) -> String {
        format!("{} - {}", self.pregunta, self.opcion)
    }
}

/// Guest table of one wedding: a server page plus the full set, which backs
/// search and answer filters.
pub struct GuestRoster {
    guests: GuestsService,
    boda_id: String,
    page_size: usize,
    state: RosterState,
    page: Listing<Invitado>,
    everyone: Vec<Invitado>,
    filtered: Option<Vec<Invitado>>,
    filter: Option<AnswerFilter>,
    notice: Option<RosterNotice>,
}

impl GuestRoster {
    pub fn new(guests: GuestsService, boda_id: &str) -> Self {
        Self {
            guests,
            boda_id: boda_id.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            state: RosterState::Idle,
            page: Listing::default(),
            everyone: vec![],
            filtered: None,
            filter: None,
            notice: None,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Fetches the requested page and the full set at the same time.
    pub async fn load(&mut self, page: usize) -> Result<()> {
        self.state = RosterState::Loading;
        info!("Loading guests of {} (page {})", self.boda_id, page);

        let (page_result, all_result) = tokio::join!(
            self.guests.page(&self.boda_id, page, self.page_size, None),
            self.guests.all(&self.boda_id)
        );

        match page_result.and_then(|p| all_result.map(|a| (p, a))) {
            Ok((page, all)) => {
                self.page = page;
                self.everyone = all.data;
                self.filtered = None;
                self.filter = None;
                self.notice = None;
                self.state = RosterState::Loaded;
                Ok(())
            }
            Err(e) => {
                error!("Failed to load guests: {}", e);
                self.state = RosterState::Error(e.to_string());
                Err(e)
            }
        }
    }

    pub fn state(&self) -> &RosterState {
        &self.state
    }

    pub fn notice(&self) -> Option<RosterNotice> {
        self.notice
    }

    /// Server-reported total, whatever page is shown.
    pub fn total(&self) -> usize {
        self.page.meta.total
    }

    pub fn meta(&self) -> ListMeta {
        self.page.meta
    }

    /// Pagination applies only while neither a search nor a filter is active.
    pub fn shows_pagination(&self) -> bool {
        self.filtered.is_none()
    }

    pub fn visible(&self) -> &[Invitado] {
        self.filtered.as_deref().unwrap_or(&self.page.data)
    }

    pub fn everyone(&self) -> &[Invitado] {
        &self.everyone
    }

    pub fn active_filter(&self) -> Option<&AnswerFilter> {
        self.filter.as_ref()
    }

    /// In-memory search over the full set. An empty query restores the page.
    pub fn search(&mut self, query: &str) -> &[Invitado] {
        self.filter = None;
        if query.trim().is_empty() {
            self.filtered = None;
            self.notice = None;
            return &self.page.data;
        }

        let matches: Vec<Invitado> = self
            .everyone
            .iter()
            .filter(|g| matches_guest(&g.nombre, &g.telefono, query))
            .cloned()
            .collect();
        debug!("Search {:?} matched {} guests", query, matches.len());
        self.set_results(matches)
    }

    /// Server-side filter by answer. The selection is checked first and an
    /// incomplete one never issues a request.
    pub async fn filter_by_answer(
        &mut self,
        pregunta: Option<&Pregunta>,
        opcion: Option<&str>,
    ) -> Result<&[Invitado]> {
        let filter = AnswerFilter::select(pregunta, opcion)?;
        let found = self
            .guests
            .filter(&self.boda_id, &filter.pregunta_id, &filter.opcion)
            .await?;
        info!("Filter {} matched {} guests", filter.list_name(), found.data.len());
        self.filter = Some(filter);
        Ok(self.set_results(found.data))
    }

    pub fn clear(&mut self) {
        self.filtered = None;
        self.filter = None;
        self.notice = None;
    }

    /// Turns the current answer filter into a broadcast list named
    /// "{question} - {option}". Membership comes from a fresh query, so
    /// guests who answered after the filter ran are included.
    pub async fn create_list_from_filter(&mut self, lists: &mut ListManager) -> Result<ListaDifusion> {
        let filter = self
            .filter
            .clone()
            .ok_or_else(|| ClientError::validation("Filter the guests by an answer first"))?;
        let found = self
            .guests
            .filter(&self.boda_id, &filter.pregunta_id, &filter.opcion)
            .await?;
        let ids: Vec<String> = found.data.iter().map(|g| g.id.clone()).collect();
        debug!("List {} built from {} guests", filter.list_name(), ids.len());
        self.set_results(found.data);
        lists.create(&filter.list_name(), &ids).await
    }

    fn set_results(&mut self, results: Vec<Invitado>) -> &[Invitado] {
        self.notice = results.is_empty().then_some(RosterNotice::NoMatches);
        self.filtered.insert(results).as_slice()
    }
}
