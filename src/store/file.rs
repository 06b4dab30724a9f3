use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::path::Path;

use crate::catalog::RecipeRecord;

// Expected CSV column headers.
const ID_COL: &str = "id";
const TITLE_COL: &str = "title";
const MEAL_TYPE_COL: &str = "meal_type";
const TASTE_COL: &str = "taste_profile";
const COOK_TIME_COL: &str = "cook_time_minutes";
const APPLIANCE_COL: &str = "appliance";
const INGREDIENTS_COL: &str = "ingredients";

// Ingredient lists live in a single CSV cell, separated by this.
const INGREDIENT_SEPARATOR: char = ';';

/// Reads raw recipe records from a CSV export. Rows missing an id, title,
/// or parseable cook time are skipped rather than failing the whole load; a
/// file with headers but no usable rows yields an empty record list, which
/// the catalog treats as a valid empty state.
pub fn load_recipes_from_csv(csv_path: &Path) -> Result<Vec<RecipeRecord>> {
    if !csv_path.exists() {
        return Err(anyhow::anyhow!("Recipe CSV file not found at: {:?}", csv_path));
    }

    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open recipe CSV file at {:?}", csv_path))?;
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers = rdr.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow::anyhow!("Column '{}' not found", name))
    };

    let id_idx = column(ID_COL)?;
    let title_idx = column(TITLE_COL)?;
    let meal_type_idx = column(MEAL_TYPE_COL)?;
    let taste_idx = column(TASTE_COL)?;
    let cook_time_idx = column(COOK_TIME_COL)?;
    let appliance_idx = column(APPLIANCE_COL)?;
    let ingredients_idx = column(INGREDIENTS_COL)?;

    let mut records = Vec::new();
    for (row_index, result) in rdr.records().enumerate() {
        let record =
            result.with_context(|| format!("Failed to read record at row index {}", row_index))?;

        let id = record.get(id_idx).unwrap_or("").trim().to_string();
        let title = record.get(title_idx).unwrap_or("").trim().to_string();
        if id.is_empty() || title.is_empty() {
            continue;
        }

        let cook_time_minutes = match record
            .get(cook_time_idx)
            .and_then(|s| s.trim().parse::<u32>().ok())
        {
            Some(minutes) => minutes,
            None => continue,
        };

        let ingredients: Vec<String> = record
            .get(ingredients_idx)
            .unwrap_or("")
            .split(INGREDIENT_SEPARATOR)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        records.push(RecipeRecord {
            id,
            title,
            meal_type: record.get(meal_type_idx).unwrap_or("").trim().to_string(),
            taste_profile: record.get(taste_idx).unwrap_or("").trim().to_string(),
            cook_time_minutes,
            appliance: record.get(appliance_idx).unwrap_or("").trim().to_string(),
            ingredients,
        });
    }

    Ok(records)
}

/// Reads raw recipe records from a JSON array file, the format the remote
/// store serves.
pub fn load_recipes_from_json(json_path: &Path) -> Result<Vec<RecipeRecord>> {
    let contents = std::fs::read_to_string(json_path)
        .with_context(|| format!("Failed to read recipe JSON file at {:?}", json_path))?;
    let records: Vec<RecipeRecord> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse recipe JSON file at {:?}", json_path))?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv_file() -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        writeln!(
            file,
            "{},{},{},{},{},{},{}",
            ID_COL, TITLE_COL, MEAL_TYPE_COL, TASTE_COL, COOK_TIME_COL, APPLIANCE_COL, INGREDIENTS_COL
        )?;
        writeln!(file, "r1,Spinach Omelette,breakfast,savory,15,stovetop,egg; spinach; cheese")?;
        writeln!(file, "r2,Shakshuka,breakfast,savory,25,stovetop,egg;spinach;tomato")?;
        writeln!(file, ",No Id,dinner,savory,30,oven,egg")?; // missing id
        writeln!(file, "r3,Bad Minutes,dinner,savory,soon,oven,egg")?; // unparseable cook time
        file.flush()?;
        Ok(file)
    }

    #[test]
    fn test_load_recipes_from_csv_success() -> Result<()> {
        let file = create_test_csv_file()?;
        let records = load_recipes_from_csv(file.path())?;

        assert_eq!(records.len(), 2); // bad rows skipped

        let omelette = records.iter().find(|r| r.id == "r1").unwrap();
        assert_eq!(omelette.title, "Spinach Omelette");
        assert_eq!(omelette.cook_time_minutes, 15);
        assert_eq!(omelette.ingredients, vec!["egg", "spinach", "cheese"]);
        Ok(())
    }

    #[test]
    fn test_load_recipes_from_csv_missing_column() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        // Missing INGREDIENTS_COL
        writeln!(
            file,
            "{},{},{},{},{},{}",
            ID_COL, TITLE_COL, MEAL_TYPE_COL, TASTE_COL, COOK_TIME_COL, APPLIANCE_COL
        )?;
        writeln!(file, "r1,Toast,breakfast,savory,5,toaster")?;
        file.flush()?;

        let result = load_recipes_from_csv(file.path());
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains(&format!("Column '{}' not found", INGREDIENTS_COL)));
        Ok(())
    }

    #[test]
    fn test_load_recipes_from_csv_empty_file_with_headers() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(
            file,
            "{},{},{},{},{},{},{}",
            ID_COL, TITLE_COL, MEAL_TYPE_COL, TASTE_COL, COOK_TIME_COL, APPLIANCE_COL, INGREDIENTS_COL
        )?;
        file.flush()?;

        // Zero recipes is a valid catalog state, not a load error.
        let records = load_recipes_from_csv(file.path())?;
        assert!(records.is_empty());
        Ok(())
    }

    #[test]
    fn test_load_recipes_from_csv_file_not_found() {
        let path = Path::new("this_file_does_not_exist.csv");
        let result = load_recipes_from_csv(path);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Recipe CSV file not found"));
    }

    #[test]
    fn test_load_recipes_from_json() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(
            file,
            r#"[{{"id":"r1","title":"Pancakes","meal_type":"breakfast","taste_profile":"sweet","cook_time_minutes":20,"appliance":"stovetop","ingredients":["flour","egg","milk"]}}]"#
        )?;
        file.flush()?;

        let records = load_recipes_from_json(file.path())?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Pancakes");
        assert_eq!(records[0].ingredients.len(), 3);
        Ok(())
    }
}
