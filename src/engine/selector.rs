use rand::Rng;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::{MealType, RecipeCatalog, TasteProfile};
use crate::dietary::DietaryFilter;
use crate::ingredient::Ingredient;

/// Accepted-ingredient count at or below which suggestions stay in the
/// Broad (exploration) stage.
pub const BROAD_STAGE_THRESHOLD: usize = 4;

/// How many of the top-ranked suggestions the randomized pick draws from.
pub const SUGGESTION_TOP_K: usize = 3;

/// A candidate next ingredient with the counts used to rank it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub ingredient: Ingredient,
    /// Candidate recipes this ingredient would move closer to completion.
    pub recipe_matches: u32,
    /// Distinct (meal type, taste profile, appliance) shapes this ingredient
    /// appears in across the candidate pool; a proxy for genericness.
    pub flexibility: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Broad,
    Specific,
}

impl Stage {
    pub fn for_accepted_count(accepted_count: usize, broad_threshold: usize) -> Self {
        if accepted_count <= broad_threshold {
            Stage::Broad
        } else {
            Stage::Specific
        }
    }
}

/// Source of the randomized top-K pick. Production code uses
/// [`RandomPicker`]; tests inject a deterministic picker so the ranked
/// candidate set can be asserted on while the pick itself stays free to
/// vary in production.
pub trait SuggestionPicker {
    /// Returns an index in `0..bound`. `bound` is always at least 1.
    fn pick(&mut self, bound: usize) -> usize;
}

pub struct RandomPicker;

impl SuggestionPicker for RandomPicker {
    fn pick(&mut self, bound: usize) -> usize {
        rand::thread_rng().gen_range(0..bound)
    }
}

/// Always takes the single best-ranked suggestion. Useful for reproducible
/// runs and tests.
pub struct FirstPicker;

impl SuggestionPicker for FirstPicker {
    fn pick(&mut self, _bound: usize) -> usize {
        0
    }
}

#[derive(Default)]
struct Tally {
    recipe_matches: u32,
    shapes: BTreeSet<(MealType, TasteProfile, String)>,
}

/// Scores every still-suggestible missing ingredient across the candidate
/// pool and returns them ranked for the given stage. Accepted, rejected,
/// and dietary-disallowed ingredients are excluded before scoring. Ties are
/// broken by ingredient name so the ranking is a strict total order.
pub fn rank_missing(
    catalog: &RecipeCatalog,
    candidates: &[usize],
    accepted: &BTreeSet<Ingredient>,
    rejected: &BTreeSet<Ingredient>,
    stage: Stage,
    dietary: Option<(&DietaryFilter, &[String])>,
) -> Vec<Suggestion> {
    let mut tallies: BTreeMap<Ingredient, Tally> = BTreeMap::new();

    for &index in candidates {
        let recipe = catalog.recipe(index);
        for ingredient in &recipe.ingredients {
            if accepted.contains(ingredient) || rejected.contains(ingredient) {
                continue;
            }
            if let Some((filter, restrictions)) = dietary {
                if !filter.is_allowed(ingredient, restrictions) {
                    continue;
                }
            }
            let tally = tallies.entry(ingredient.clone()).or_default();
            tally.recipe_matches += 1;
            tally.shapes.insert((
                recipe.meal_type,
                recipe.taste_profile,
                recipe.appliance.clone(),
            ));
        }
    }

    let mut suggestions: Vec<Suggestion> = tallies
        .into_iter()
        .map(|(ingredient, tally)| Suggestion {
            ingredient,
            recipe_matches: tally.recipe_matches,
            flexibility: tally.shapes.len() as u32,
        })
        .collect();

    match stage {
        // Broad: favor generically useful ingredients so the pool is not
        // prematurely narrowed to one recipe style.
        Stage::Broad => suggestions.sort_by(|a, b| {
            (Reverse(a.flexibility), Reverse(a.recipe_matches), &a.ingredient)
                .cmp(&(Reverse(b.flexibility), Reverse(b.recipe_matches), &b.ingredient))
        }),
        // Specific: the goal has shifted to completion, so favor ingredients
        // that finish the most recipes in the now-narrow pool.
        Stage::Specific => suggestions.sort_by(|a, b| {
            (Reverse(a.recipe_matches), Reverse(a.flexibility), &a.ingredient)
                .cmp(&(Reverse(b.recipe_matches), Reverse(b.flexibility), &b.ingredient))
        }),
    }

    suggestions
}

/// Ranks missing ingredients and picks one uniformly among the top `top_k`.
/// Returns `None` when the candidate pool offers nothing suggestible.
pub fn select_next(
    catalog: &RecipeCatalog,
    candidates: &[usize],
    accepted: &BTreeSet<Ingredient>,
    rejected: &BTreeSet<Ingredient>,
    stage: Stage,
    top_k: usize,
    dietary: Option<(&DietaryFilter, &[String])>,
    picker: &mut dyn SuggestionPicker,
) -> Option<Suggestion> {
    let ranked = rank_missing(catalog, candidates, accepted, rejected, stage, dietary);
    if ranked.is_empty() {
        return None;
    }
    let bound = top_k.clamp(1, ranked.len());
    Some(ranked[picker.pick(bound)].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_record;
    use crate::ingredient::normalize;

    fn accepted(names: &[&str]) -> BTreeSet<Ingredient> {
        names.iter().map(|n| normalize(n)).collect()
    }

    fn two_recipe_catalog() -> RecipeCatalog {
        RecipeCatalog::from_records(vec![
            test_record("r1", "breakfast", "savory", 15, "stovetop", &["egg", "spinach", "cheese"]),
            test_record("r2", "breakfast", "savory", 25, "oven", &["egg", "spinach", "tomato"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_broad_stage_suggestion_scenario() {
        let catalog = two_recipe_catalog();
        let ranked = rank_missing(
            &catalog,
            &[0, 1],
            &accepted(&["egg"]),
            &BTreeSet::new(),
            Stage::Broad,
            None,
        );

        // Only the not-yet-accepted ingredients are offered.
        let names: Vec<&str> = ranked.iter().map(|s| s.ingredient.as_str()).collect();
        assert_eq!(names.len(), 3);
        assert!(!names.contains(&"egg"));

        // Spinach appears in both recipes (two shapes), cheese and tomato in
        // one each.
        assert_eq!(ranked[0].ingredient, normalize("spinach"));
        assert_eq!(ranked[0].recipe_matches, 2);
        assert_eq!(ranked[0].flexibility, 2);
        assert_eq!(ranked[1].recipe_matches, 1);
    }

    #[test]
    fn test_stage_switch_at_threshold() {
        assert_eq!(Stage::for_accepted_count(0, 4), Stage::Broad);
        assert_eq!(Stage::for_accepted_count(4, 4), Stage::Broad);
        assert_eq!(Stage::for_accepted_count(5, 4), Stage::Specific);
    }

    #[test]
    fn test_broad_prefers_flexibility_specific_prefers_matches() {
        // noodle: 3 matches, 1 shape. onion: 2 matches, 2 shapes.
        let catalog = RecipeCatalog::from_records(vec![
            test_record("r1", "dinner", "savory", 20, "stovetop", &["egg", "noodle", "pea"]),
            test_record("r2", "dinner", "savory", 25, "stovetop", &["egg", "noodle", "onion"]),
            test_record("r3", "dinner", "savory", 30, "stovetop", &["egg", "noodle", "carrot"]),
            test_record("r4", "breakfast", "sweet", 10, "oven", &["egg", "onion", "flour"]),
        ])
        .unwrap();
        let all = vec![0, 1, 2, 3];
        let accepted = accepted(&["egg"]);

        let broad = rank_missing(&catalog, &all, &accepted, &BTreeSet::new(), Stage::Broad, None);
        assert_eq!(broad[0].ingredient, normalize("onion"));

        let specific =
            rank_missing(&catalog, &all, &accepted, &BTreeSet::new(), Stage::Specific, None);
        assert_eq!(specific[0].ingredient, normalize("noodle"));
        assert_eq!(specific[0].recipe_matches, 3);
    }

    #[test]
    fn test_rejected_ingredients_never_ranked() {
        let catalog = two_recipe_catalog();
        let rejected: BTreeSet<Ingredient> = [normalize("cheese")].into_iter().collect();
        let ranked = rank_missing(
            &catalog,
            &[0, 1],
            &accepted(&["egg"]),
            &rejected,
            Stage::Broad,
            None,
        );
        assert!(ranked.iter().all(|s| s.ingredient != normalize("cheese")));
    }

    #[test]
    fn test_dietary_exclusion_happens_before_scoring() {
        let catalog = two_recipe_catalog();
        let mut filter = DietaryFilter::default();
        filter.add_restriction("dairy-free", &["cheese"]);
        let restrictions = vec!["dairy-free".to_string()];

        let ranked = rank_missing(
            &catalog,
            &[0, 1],
            &accepted(&["egg"]),
            &BTreeSet::new(),
            Stage::Broad,
            Some((&filter, &restrictions)),
        );
        let names: Vec<&str> = ranked.iter().map(|s| s.ingredient.as_str()).collect();
        assert_eq!(names, vec!["spinach", "tomato"]);
    }

    #[test]
    fn test_ties_break_by_ingredient_name() {
        let catalog = two_recipe_catalog();
        let ranked = rank_missing(
            &catalog,
            &[0, 1],
            &accepted(&["egg", "spinach"]),
            &BTreeSet::new(),
            Stage::Specific,
            None,
        );
        // cheese and tomato have identical counts; name order decides.
        let names: Vec<&str> = ranked.iter().map(|s| s.ingredient.as_str()).collect();
        assert_eq!(names, vec!["cheese", "tomato"]);
    }

    #[test]
    fn test_empty_candidates_yield_no_suggestions() {
        let catalog = two_recipe_catalog();
        let mut picker = FirstPicker;
        let pick = select_next(
            &catalog,
            &[],
            &BTreeSet::new(),
            &BTreeSet::new(),
            Stage::Broad,
            SUGGESTION_TOP_K,
            None,
            &mut picker,
        );
        assert!(pick.is_none());
    }

    struct FixedPicker(usize);

    impl SuggestionPicker for FixedPicker {
        fn pick(&mut self, bound: usize) -> usize {
            self.0.min(bound - 1)
        }
    }

    #[test]
    fn test_top_k_pick_stays_within_ranked_prefix() {
        let catalog = two_recipe_catalog();
        let accepted = accepted(&["egg"]);

        // Whatever index the picker returns, the pick comes from the ranked
        // top-K; with K=3 and three suggestible ingredients, any of them.
        for index in 0..5 {
            let mut picker = FixedPicker(index);
            let pick = select_next(
                &catalog,
                &[0, 1],
                &accepted,
                &BTreeSet::new(),
                Stage::Broad,
                SUGGESTION_TOP_K,
                None,
                &mut picker,
            )
            .unwrap();
            assert!(["spinach", "cheese", "tomato"].contains(&pick.ingredient.as_str()));
        }

        // K=1 pins the pick to the top-ranked suggestion.
        let mut picker = FixedPicker(2);
        let pick = select_next(
            &catalog,
            &[0, 1],
            &accepted,
            &BTreeSet::new(),
            Stage::Broad,
            1,
            None,
            &mut picker,
        )
        .unwrap();
        assert_eq!(pick.ingredient, normalize("spinach"));
    }
}
