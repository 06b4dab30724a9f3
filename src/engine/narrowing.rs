use serde::Serialize;
use std::collections::BTreeSet;

use crate::catalog::{Preferences, Recipe, RecipeCatalog};
use crate::engine::selector::Suggestion;
use crate::ingredient::Ingredient;

/// Result of a single swipe, with the three caller-visible situations kept
/// distinct: recipes are ready, the pool is a dead end, or narrowing
/// continues (possibly with nothing left to suggest).
#[derive(Debug, Clone, PartialEq)]
pub enum SwipeOutcome {
    /// At least one candidate recipe is fully satisfied by the accepted set.
    Ready {
        recipes: Vec<Recipe>,
        candidates_count: usize,
    },
    /// Candidates remain but none is satisfied yet. `suggestion` is `None`
    /// when every missing ingredient has been rejected or disallowed.
    Narrowing {
        suggestion: Option<Suggestion>,
        candidates_count: usize,
    },
    /// No recipe contains the full accepted set; the caller should offer a
    /// restart or backtrack.
    DeadEnd,
}

impl SwipeOutcome {
    pub fn to_response(&self) -> SwipeResponse {
        match self {
            SwipeOutcome::Ready {
                recipes,
                candidates_count,
            } => SwipeResponse {
                ready: recipes.clone(),
                candidates_count: *candidates_count,
                suggestion: None,
                dead_end: false,
            },
            SwipeOutcome::Narrowing {
                suggestion,
                candidates_count,
            } => SwipeResponse {
                ready: Vec::new(),
                candidates_count: *candidates_count,
                suggestion: suggestion.clone(),
                dead_end: false,
            },
            SwipeOutcome::DeadEnd => SwipeResponse {
                ready: Vec::new(),
                candidates_count: 0,
                suggestion: None,
                dead_end: true,
            },
        }
    }
}

/// Wire shape of a swipe result, as served to the API layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeResponse {
    pub ready: Vec<Recipe>,
    pub candidates_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Suggestion>,
    pub dead_end: bool,
}

/// The (accepted, rejected, candidates) triple for one session, with the
/// narrowing transitions. Candidates are indices into the shared catalog and
/// only ever shrink between resets.
#[derive(Debug, Clone)]
pub struct EngineState {
    accepted_order: Vec<Ingredient>,
    accepted: BTreeSet<Ingredient>,
    rejected: BTreeSet<Ingredient>,
    candidates: Vec<usize>,
}

impl EngineState {
    /// Seeds the candidate pool from the preference-filtered catalog.
    pub fn seed(catalog: &RecipeCatalog, preferences: &Preferences) -> Self {
        Self {
            accepted_order: Vec::new(),
            accepted: BTreeSet::new(),
            rejected: BTreeSet::new(),
            candidates: catalog.filter_by_preferences(preferences),
        }
    }

    /// Accepts a canonical ingredient and narrows the pool to recipes that
    /// contain it. Accepting something already accepted changes nothing;
    /// accepting something previously rejected un-rejects it (accept wins).
    pub fn accept(&mut self, catalog: &RecipeCatalog, ingredient: Ingredient) {
        if self.accepted.contains(&ingredient) {
            return;
        }
        self.rejected.remove(&ingredient);
        self.accepted.insert(ingredient.clone());
        self.accepted_order.push(ingredient.clone());

        // Previous candidates already contain every earlier accepted
        // ingredient, so one membership check per recipe suffices. The pool
        // can only shrink here.
        self.candidates
            .retain(|&index| catalog.recipe(index).ingredients.contains(&ingredient));

        self.check_invariants(catalog);
    }

    /// Rejects a canonical ingredient. Every recipe ingredient is required,
    /// so candidates that need the rejected ingredient are eliminated.
    /// Rejecting an already accepted ingredient is ignored.
    pub fn reject(&mut self, catalog: &RecipeCatalog, ingredient: Ingredient) {
        if self.accepted.contains(&ingredient) {
            return;
        }
        self.rejected.insert(ingredient.clone());
        self.candidates
            .retain(|&index| !catalog.recipe(index).ingredients.contains(&ingredient));

        self.check_invariants(catalog);
    }

    pub fn reset(&mut self, catalog: &RecipeCatalog, preferences: &Preferences) {
        *self = Self::seed(catalog, preferences);
    }

    /// Candidate indices whose entire ingredient list is covered by the
    /// accepted set.
    pub fn ready_indices(&self, catalog: &RecipeCatalog) -> Vec<usize> {
        if self.accepted.is_empty() {
            return Vec::new();
        }
        self.candidates
            .iter()
            .copied()
            .filter(|&index| {
                catalog
                    .recipe(index)
                    .ingredients
                    .iter()
                    .all(|ingredient| self.accepted.contains(ingredient))
            })
            .collect()
    }

    pub fn candidates(&self) -> &[usize] {
        &self.candidates
    }

    pub fn accepted(&self) -> &BTreeSet<Ingredient> {
        &self.accepted
    }

    /// Accepted ingredients in swipe order, for UX display.
    pub fn accepted_in_order(&self) -> &[Ingredient] {
        &self.accepted_order
    }

    pub fn rejected(&self) -> &BTreeSet<Ingredient> {
        &self.rejected
    }

    // Invariant violations here are programming errors, not user input
    // errors; they fail fast in debug/test builds only.
    fn check_invariants(&self, catalog: &RecipeCatalog) {
        debug_assert!(self.accepted.is_disjoint(&self.rejected));
        debug_assert!(self.candidates.iter().all(|&index| index < catalog.len()));
        debug_assert!(self
            .candidates
            .iter()
            .all(|&index| self.accepted.is_subset(&catalog.recipe(index).ingredients)));
    }
}
