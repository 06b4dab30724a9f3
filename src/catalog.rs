use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::ingredient::{normalize, Ingredient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealType {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            other => Err(anyhow!("Unknown meal type: '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TasteProfile {
    Sweet,
    Savory,
}

impl TasteProfile {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sweet" => Ok(TasteProfile::Sweet),
            "savory" | "savoury" => Ok(TasteProfile::Savory),
            other => Err(anyhow!("Unknown taste profile: '{}'", other)),
        }
    }
}

/// A raw recipe row as produced by a recipe store, before any
/// canonicalization. Field names match what the stores serve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeRecord {
    pub id: String,
    pub title: String,
    pub meal_type: String,
    pub taste_profile: String,
    pub cook_time_minutes: u32,
    pub appliance: String,
    pub ingredients: Vec<String>,
}

/// An immutable catalog entry. Constructed once at load time; ingredient
/// names are canonical from here on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub meal_type: MealType,
    pub taste_profile: TasteProfile,
    pub cook_time_minutes: u32,
    pub appliance: String,
    pub ingredients: BTreeSet<Ingredient>,
}

/// Optional filters applied once when seeding a session's candidate pool.
/// Absent filters impose no constraint.
#[derive(Debug, Clone, Default)]
pub struct Preferences {
    pub meal_type: Option<MealType>,
    pub taste_profile: Option<TasteProfile>,
    pub max_cook_time: Option<u32>,
}

/// Read-only view of every recipe, loaded once at startup and shared across
/// sessions.
#[derive(Debug, Default)]
pub struct RecipeCatalog {
    recipes: Vec<Recipe>,
}

impl RecipeCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the catalog from raw store records, canonicalizing ingredient
    /// names. An empty record list is a valid (empty) catalog; a record with
    /// no ingredients or a zero cook time is malformed and fails the load.
    pub fn from_records(records: Vec<RecipeRecord>) -> Result<Self> {
        let mut recipes = Vec::with_capacity(records.len());
        for record in records {
            let meal_type = MealType::parse(&record.meal_type)
                .with_context(|| format!("Recipe '{}' has a bad meal type", record.id))?;
            let taste_profile = TasteProfile::parse(&record.taste_profile)
                .with_context(|| format!("Recipe '{}' has a bad taste profile", record.id))?;
            if record.cook_time_minutes == 0 {
                return Err(anyhow!("Recipe '{}' has a zero cook time", record.id));
            }

            let ingredients: BTreeSet<Ingredient> = record
                .ingredients
                .iter()
                .filter(|raw| !raw.trim().is_empty())
                .map(|raw| normalize(raw))
                .collect();
            if ingredients.is_empty() {
                return Err(anyhow!("Recipe '{}' has no ingredients", record.id));
            }

            recipes.push(Recipe {
                id: record.id,
                title: record.title,
                meal_type,
                taste_profile,
                cook_time_minutes: record.cook_time_minutes,
                appliance: record.appliance.trim().to_lowercase(),
                ingredients,
            });
        }
        Ok(Self { recipes })
    }

    pub fn all(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn recipe(&self, index: usize) -> &Recipe {
        &self.recipes[index]
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Indices of recipes matching the given preferences. `max_cook_time` is
    /// inclusive.
    pub fn filter_by_preferences(&self, preferences: &Preferences) -> Vec<usize> {
        self.recipes
            .iter()
            .enumerate()
            .filter(|(_, recipe)| {
                preferences
                    .meal_type
                    .map_or(true, |meal| recipe.meal_type == meal)
                    && preferences
                        .taste_profile
                        .map_or(true, |taste| recipe.taste_profile == taste)
                    && preferences
                        .max_cook_time
                        .map_or(true, |max| recipe.cook_time_minutes <= max)
            })
            .map(|(index, _)| index)
            .collect()
    }
}

#[cfg(test)]
pub(crate) fn test_record(id: &str, meal: &str, taste: &str, minutes: u32, appliance: &str, ingredients: &[&str]) -> RecipeRecord {
    RecipeRecord {
        id: id.to_string(),
        title: format!("Recipe {}", id),
        meal_type: meal.to_string(),
        taste_profile: taste.to_string(),
        cook_time_minutes: minutes,
        appliance: appliance.to_string(),
        ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
    }
}
