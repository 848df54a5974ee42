use std::collections::{HashMap, VecDeque};
use std::fmt;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::gemini::GeminiError;
use crate::models::{Concept, DesignInputs, Lead, LoadingState};

pub const HISTORY_LIMIT: usize = 12;
/// Most recent contact requests kept per session.
pub const LEAD_LIMIT: usize = 5;
/// Lets the results grid render before the view scrolls to it.
pub const RESULTS_SCROLL_DELAY_MS: u64 = 100;

pub const GENERATION_FAILED_NOTICE: &str =
    "Something went wrong while communicating with the design AI. Please check your API key and try again.";
pub const LEAD_THANK_YOU: &str =
    "Thank you! Our design team will be in touch shortly to discuss your project.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("a batch is already being generated")] Busy,
    #[error("no concepts to refine yet")] NothingToRefine,
    #[error("unknown concept {0}")] UnknownConcept(Uuid),
    #[error("{0}")] InvalidLead(&'static str),
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Region { Form, Results }

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub region: Region,
    pub delay_ms: u64,
}

/// What the page should show for the current state.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub form_disabled: bool,
    pub show_loading_overlay: bool,
    pub show_results: bool,
    pub show_history: bool,
    pub scroll: Option<ScrollRequest>,
}

/// One visitor's run through the design tool.
#[derive(Debug, Clone, Default)]
pub struct DesignSession {
    state: LoadingState,
    current: Vec<Concept>,
    history: VecDeque<Concept>,
    form_initial_values: Option<DesignInputs>,
    notice: Option<&'static str>,
    scroll: Option<ScrollRequest>,
    leads: Vec<Lead>,
}

impl DesignSession {
    pub fn state(&self) -> LoadingState { self.state }
    pub fn current(&self) -> &[Concept] { &self.current }
    pub fn history(&self) -> impl Iterator<Item = &Concept> { self.history.iter() }
    pub fn form_initial_values(&self) -> Option<&DesignInputs> { self.form_initial_values.as_ref() }
    pub fn notice(&self) -> Option<&'static str> { self.notice }
    pub fn leads(&self) -> &[Lead] { &self.leads }

    /// Enters `Generating`. Only one batch may be in flight per session.
    pub fn begin(&mut self) -> Result<(), SessionError> {
        if self.state == LoadingState::Generating {
            return Err(SessionError::Busy);
        }
        self.state = LoadingState::Generating;
        self.notice = None;
        self.scroll = None;
        Ok(())
    }

    /// Applies the outcome of the batch started by [`begin`](Self::begin).
    pub fn finish(&mut self, outcome: Result<[Concept; 3], GeminiError>) {
        match outcome {
            Ok(batch) => {
                for concept in batch.iter().rev() {
                    self.history.push_front(concept.clone());
                }
                self.history.truncate(HISTORY_LIMIT);
                self.current = batch.into();
                self.state = LoadingState::Complete;
                self.scroll = Some(ScrollRequest { region: Region::Results, delay_ms: RESULTS_SCROLL_DELAY_MS });
                info!("✅ Session complete with {} concepts, {} in history", self.current.len(), self.history.len());
            }
            Err(e) => self.fail(e),
        }
    }

    /// Enters `Error`, keeping the previous concepts and history.
    pub fn fail(&mut self, reason: impl fmt::Display) {
        warn!("⚠️ Generation failed: {}", reason);
        self.state = LoadingState::Error;
        self.notice = Some(GENERATION_FAILED_NOTICE);
        self.scroll = None;
    }

    /// Copies a concept's brief back into the form. The loading state is left alone.
    pub fn refine(&mut self, concept_id: Uuid) -> Result<&DesignInputs, SessionError> {
        if self.current.is_empty() && self.history.is_empty() {
            return Err(SessionError::NothingToRefine);
        }
        let inputs = self.current.iter()
            .chain(self.history.iter())
            .find(|c| c.id == concept_id)
            .map(|c| c.inputs.clone())
            .ok_or(SessionError::UnknownConcept(concept_id))?;
        self.scroll = Some(ScrollRequest { region: Region::Form, delay_ms: 0 });
        Ok(self.form_initial_values.insert(inputs))
    }

    pub fn find_concept(&self, concept_id: Uuid) -> Option<&Concept> {
        self.current.iter().chain(self.history.iter()).find(|c| c.id == concept_id)
    }

    /// Records a request to be contacted about the current concepts.
    pub fn capture_lead(&mut self, name: &str, email: &str) -> Result<&'static str, SessionError> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() {
            return Err(SessionError::InvalidLead("Please enter your name"));
        }
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            return Err(SessionError::InvalidLead("Please enter a valid email address"));
        }
        self.leads.push(Lead {
            name: name.to_string(),
            email: email.to_string(),
            concept_ids: self.current.iter().map(|c| c.id).collect(),
            submitted_at: Utc::now(),
        });
        if self.leads.len() > LEAD_LIMIT {
            self.leads.remove(0);
        }
        info!("📨 Lead captured for {} concepts", self.current.len());
        Ok(LEAD_THANK_YOU)
    }

    pub fn view(&self) -> ViewState {
        let generating = self.state == LoadingState::Generating;
        ViewState {
            form_disabled: generating,
            show_loading_overlay: generating,
            show_results: !self.current.is_empty(),
            show_history: !self.history.is_empty(),
            scroll: self.scroll,
        }
    }
}

/// Sessions by id, capped at `capacity`; the oldest session is evicted first.
#[derive(Debug)]
pub struct SessionStore {
    sessions: HashMap<Uuid, DesignSession>,
    order: VecDeque<Uuid>,
    capacity: usize,
}

impl SessionStore {
    pub fn new(capacity: usize) -> Self {
        Self { sessions: HashMap::new(), order: VecDeque::new(), capacity: capacity.max(1) }
    }

    pub fn insert(&mut self, id: Uuid, session: DesignSession) {
        if self.sessions.insert(id, session).is_none() {
            self.order.push_back(id);
        }
        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.sessions.remove(&evicted);
                info!("🧹 Evicted design session {}", evicted);
            }
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<&DesignSession> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &Uuid) -> Option<&mut DesignSession> {
        self.sessions.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }
}
