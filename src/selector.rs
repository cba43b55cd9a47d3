//! Picker dialog used to choose a counterpart (a doctor or a patient).

use async_trait::async_trait;
use log::{error, info};
use thiserror::Error;

use crate::api::{ApiError, ListQuery, UsersApi};
use crate::models::{Role, User};

pub const LOADING_MESSAGE: &str = "Loading...";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error("No candidate with id `{0}`")]
    UnknownCandidate(String),
    #[error("The selector is closed")]
    Closed,
}

/// Where the candidates come from. The portal asks `GET /users?role=`.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn candidates(&self, role: Role) -> Result<Vec<User>, ApiError>;
}

#[async_trait]
impl CandidateSource for UsersApi {
    async fn candidates(&self, role: Role) -> Result<Vec<User>, ApiError> {
        Ok(self.list(&ListQuery::role(role)).await?.users)
    }
}

/// Content of the dialog body.
#[derive(Debug, PartialEq)]
pub enum SelectorBody<'a> {
    Loading,
    Empty(String),
    Candidates(Vec<&'a User>),
}

type OnSelect = Box<dyn FnOnce(String) + Send>;
type OnClose = Box<dyn FnOnce() + Send>;

pub struct Selector {
    role: Role,
    candidates: Vec<User>,
    search: String,
    loading: bool,
    on_select: Option<OnSelect>,
    on_close: Option<OnClose>,
}

impl Selector {
    /// Opens the dialog in its loading state. Call [`Selector::load`] next.
    pub fn open(
        role: Role,
        on_select: impl FnOnce(String) + Send + 'static,
        on_close: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            role,
            candidates: Vec::new(),
            search: String::new(),
            loading: true,
            on_select: Some(Box::new(on_select)),
            on_close: Some(Box::new(on_close)),
        }
    }

    /// Fetches the candidates. A failed fetch leaves an empty list.
    pub async fn load(&mut self, source: &dyn CandidateSource) {
        match source.candidates(self.role).await {
            Ok(candidates) => {
                info!("Selector loaded {} {}(s)", candidates.len(), self.role);
                self.candidates = candidates;
            }
            Err(e) => error!("Error fetching {}s: {e}", self.role),
        }
        self.loading = false;
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_open(&self) -> bool {
        self.on_close.is_some()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, query: &str) {
        self.search = query.to_string();
    }

    /// Candidates whose name contains the search text, ignoring case.
    pub fn filtered(&self) -> Vec<&User> {
        let needle = self.search.to_lowercase();
        self.candidates
            .iter()
            .filter(|user| user.full_name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn body(&self) -> SelectorBody<'_> {
        if self.loading {
            return SelectorBody::Loading;
        }
        let filtered = self.filtered();
        if filtered.is_empty() {
            SelectorBody::Empty(format!("No {}s found.", self.role))
        } else {
            SelectorBody::Candidates(filtered)
        }
    }

    /// Reports `id` to the caller, then closes the dialog.
    pub fn select(&mut self, id: &str) -> Result<(), SelectorError> {
        if !self.is_open() {
            return Err(SelectorError::Closed);
        }
        if !self.filtered().iter().any(|user| user.id == id) {
            return Err(SelectorError::UnknownCandidate(id.to_string()));
        }

        if let Some(on_select) = self.on_select.take() {
            on_select(id.to_string());
        }
        self.close();
        Ok(())
    }

    /// Closes the dialog. Only the first call reaches `on_close`.
    pub fn close(&mut self) {
        self.on_select = None;
        if let Some(on_close) = self.on_close.take() {
            on_close();
        }
    }
}
