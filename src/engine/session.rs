use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::catalog::{Preferences, RecipeCatalog};
use crate::dietary::DietaryFilter;
use crate::engine::narrowing::{EngineState, SwipeOutcome};
use crate::engine::selector::{
    select_next, RandomPicker, Stage, Suggestion, SuggestionPicker, BROAD_STAGE_THRESHOLD,
    SUGGESTION_TOP_K,
};
use crate::ingredient::normalize;

/// Tunables for one swiping flow.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Accepted-ingredient count at or below which suggestions stay broad.
    pub broad_threshold: usize,
    /// Size of the ranked prefix the randomized pick draws from.
    pub top_k: usize,
    /// Active dietary restriction tags for this user.
    pub restrictions: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            broad_threshold: BROAD_STAGE_THRESHOLD,
            top_k: SUGGESTION_TOP_K,
            restrictions: Vec::new(),
        }
    }
}

/// Read-only view of a session's state, in the wire shape the API layer
/// serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub accepted: Vec<String>,
    pub rejected: Vec<String>,
    pub candidates_count: usize,
    pub ready_count: usize,
}

/// One user's swiping flow. This is the only mutation surface over the
/// session's sets; everything else sees read-only snapshots. Sessions share
/// nothing but the read-only catalog.
pub struct SwipeSession {
    catalog: Arc<RecipeCatalog>,
    preferences: Preferences,
    config: SessionConfig,
    dietary: Option<DietaryFilter>,
    picker: Box<dyn SuggestionPicker + Send>,
    state: EngineState,
}

impl SwipeSession {
    pub fn new(
        catalog: Arc<RecipeCatalog>,
        preferences: Preferences,
        config: SessionConfig,
    ) -> Self {
        let state = EngineState::seed(&catalog, &preferences);
        Self {
            catalog,
            preferences,
            config,
            dietary: None,
            picker: Box::new(RandomPicker),
            state,
        }
    }

    pub fn with_dietary(mut self, filter: DietaryFilter) -> Self {
        self.dietary = Some(filter);
        self
    }

    /// Swaps in a suggestion picker, letting tests pin the pick while the
    /// ranked candidate set stays deterministic either way.
    pub fn with_picker(mut self, picker: Box<dyn SuggestionPicker + Send>) -> Self {
        self.picker = picker;
        self
    }

    /// Records an accept swipe for a raw (un-normalized) ingredient name and
    /// returns what the caller should show next.
    pub fn accept_ingredient(&mut self, raw: &str) -> SwipeOutcome {
        self.state.accept(&self.catalog, normalize(raw));
        self.outcome()
    }

    /// Records a reject swipe. The ingredient is never suggested again and
    /// recipes requiring it drop out of the pool.
    pub fn reject_ingredient(&mut self, raw: &str) -> SwipeOutcome {
        self.state.reject(&self.catalog, normalize(raw));
        self.outcome()
    }

    pub fn reset(&mut self) {
        self.state.reset(&self.catalog, &self.preferences);
    }

    pub fn state(&self) -> SessionSnapshot {
        SessionSnapshot {
            accepted: self
                .state
                .accepted_in_order()
                .iter()
                .map(|ingredient| ingredient.as_str().to_string())
                .collect(),
            rejected: self
                .state
                .rejected()
                .iter()
                .map(|ingredient| ingredient.as_str().to_string())
                .collect(),
            candidates_count: self.state.candidates().len(),
            ready_count: self.state.ready_indices(&self.catalog).len(),
        }
    }

    /// What the engine would offer right now, without recording a swipe.
    /// Drives the first card of a flow and UI refreshes.
    pub fn current_suggestion(&mut self) -> Option<Suggestion> {
        let stage = Stage::for_accepted_count(
            self.state.accepted().len(),
            self.config.broad_threshold,
        );
        let dietary = self
            .dietary
            .as_ref()
            .map(|filter| (filter, self.config.restrictions.as_slice()));
        select_next(
            &self.catalog,
            self.state.candidates(),
            self.state.accepted(),
            self.state.rejected(),
            stage,
            self.config.top_k,
            dietary,
            &mut *self.picker,
        )
    }

    fn outcome(&mut self) -> SwipeOutcome {
        let ready = self.state.ready_indices(&self.catalog);
        let candidates_count = self.state.candidates().len();
        if !ready.is_empty() {
            return SwipeOutcome::Ready {
                recipes: ready
                    .into_iter()
                    .map(|index| self.catalog.recipe(index).clone())
                    .collect(),
                candidates_count,
            };
        }
        if candidates_count == 0 {
            return SwipeOutcome::DeadEnd;
        }
        SwipeOutcome::Narrowing {
            suggestion: self.current_suggestion(),
            candidates_count,
        }
    }
}

/// Per-session-id store of swiping flows. Each request attaches to its own
/// session's state; there is deliberately no process-wide shared session.
pub struct SessionArena {
    catalog: Arc<RecipeCatalog>,
    preferences: Preferences,
    config: SessionConfig,
    dietary: Option<DietaryFilter>,
    sessions: HashMap<String, SwipeSession>,
}

impl SessionArena {
    pub fn new(catalog: Arc<RecipeCatalog>) -> Self {
        Self {
            catalog,
            preferences: Preferences::default(),
            config: SessionConfig::default(),
            dietary: None,
            sessions: HashMap::new(),
        }
    }

    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_dietary(mut self, filter: DietaryFilter) -> Self {
        self.dietary = Some(filter);
        self
    }

    pub fn get_or_create(&mut self, session_id: &str) -> &mut SwipeSession {
        if !self.sessions.contains_key(session_id) {
            let mut session = SwipeSession::new(
                Arc::clone(&self.catalog),
                self.preferences.clone(),
                self.config.clone(),
            );
            if let Some(filter) = &self.dietary {
                session = session.with_dietary(filter.clone());
            }
            self.sessions.insert(session_id.to_string(), session);
        }
        self.sessions.get_mut(session_id).expect("session just inserted")
    }

    /// Resets the named session in place. Returns false if it never existed.
    pub fn reset(&mut self, session_id: &str) -> bool {
        match self.sessions.get_mut(session_id) {
            Some(session) => {
                session.reset();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
