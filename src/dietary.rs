use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::ingredient::{normalize, Ingredient};

/// Maps a dietary restriction tag to the canonical ingredients it disallows.
/// Consulted by the suggestion selector *before* scoring, so disallowed
/// ingredients never enter the ranking. Unknown restriction tags impose no
/// constraint (fail-open), matching how an unreachable restriction lookup is
/// treated upstream.
#[derive(Debug, Clone, Default)]
pub struct DietaryFilter {
    blocked: HashMap<String, HashSet<Ingredient>>,
}

impl DietaryFilter {
    /// Built-in table covering the common restriction tags.
    pub fn builtin() -> Self {
        let mut filter = DietaryFilter::default();
        filter.add_restriction(
            "vegetarian",
            &["chicken", "beef", "pork", "bacon", "ham", "shrimp", "fish", "salmon", "tuna"],
        );
        filter.add_restriction(
            "vegan",
            &[
                "chicken", "beef", "pork", "bacon", "ham", "shrimp", "fish", "salmon", "tuna",
                "egg", "cheese", "butter", "milk", "heavy cream", "yogurt", "honey",
            ],
        );
        filter.add_restriction(
            "gluten-free",
            &["flour", "pasta", "bread", "breadcrumbs", "soy sauce", "couscous"],
        );
        filter.add_restriction(
            "dairy-free",
            &["milk", "cheese", "butter", "heavy cream", "yogurt"],
        );
        filter.add_restriction(
            "nut-free",
            &["peanut", "almond", "walnut", "cashew", "pecan", "pine nut", "pistachio"],
        );
        filter
    }

    /// Loads a `{"restriction": ["ingredient", ...]}` table from a JSON
    /// file. Callers that cannot load a table should fall back to
    /// [`DietaryFilter::builtin`] or no filter at all rather than fail the
    /// session.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dietary table at {:?}", path))?;
        let table: HashMap<String, Vec<String>> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse dietary table at {:?}", path))?;

        let mut filter = DietaryFilter::default();
        for (restriction, ingredients) in table {
            let names: Vec<&str> = ingredients.iter().map(String::as_str).collect();
            filter.add_restriction(&restriction, &names);
        }
        Ok(filter)
    }

    pub fn add_restriction(&mut self, restriction: &str, ingredients: &[&str]) {
        let entry = self
            .blocked
            .entry(restriction.trim().to_lowercase())
            .or_default();
        for raw in ingredients {
            entry.insert(normalize(raw));
        }
    }

    /// True unless some active restriction blocks the ingredient. An empty
    /// restriction list or an unknown tag allows everything.
    pub fn is_allowed(&self, ingredient: &Ingredient, restrictions: &[String]) -> bool {
        restrictions.iter().all(|restriction| {
            match self.blocked.get(&restriction.trim().to_lowercase()) {
                Some(blocked) => !blocked.contains(ingredient),
                None => true,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn restrictions(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_builtin_blocks_through_normalization() {
        let filter = DietaryFilter::builtin();
        // "Chicken Breasts" normalizes to "chicken", which vegetarian blocks.
        assert!(!filter.is_allowed(&normalize("Chicken Breasts"), &restrictions(&["vegetarian"])));
        assert!(filter.is_allowed(&normalize("tofu"), &restrictions(&["vegetarian"])));
    }

    #[test]
    fn test_multiple_restrictions_all_apply() {
        let filter = DietaryFilter::builtin();
        let tags = restrictions(&["vegetarian", "dairy-free"]);
        assert!(!filter.is_allowed(&normalize("cheese"), &tags));
        assert!(!filter.is_allowed(&normalize("beef"), &tags));
        assert!(filter.is_allowed(&normalize("rice"), &tags));
    }

    #[test]
    fn test_unknown_restriction_fails_open() {
        let filter = DietaryFilter::builtin();
        assert!(filter.is_allowed(&normalize("beef"), &restrictions(&["keto"])));
        assert!(filter.is_allowed(&normalize("beef"), &[]));
    }

    #[test]
    fn test_from_json_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, r#"{{"pescatarian": ["Beef", "chicken breasts", "pork"]}}"#)?;
        file.flush()?;

        let filter = DietaryFilter::from_json_file(file.path())?;
        assert!(!filter.is_allowed(&normalize("chicken"), &restrictions(&["pescatarian"])));
        assert!(filter.is_allowed(&normalize("salmon"), &restrictions(&["pescatarian"])));
        Ok(())
    }

    #[test]
    fn test_from_json_file_bad_contents() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "not json")?;
        file.flush()?;
        assert!(DietaryFilter::from_json_file(file.path()).is_err());
        Ok(())
    }
}
