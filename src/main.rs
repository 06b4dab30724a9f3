use anyhow::{anyhow, Context, Result};
use recipe_swipe::catalog::{MealType, Preferences, RecipeCatalog, TasteProfile};
use recipe_swipe::cli::parse_args;
use recipe_swipe::dietary::DietaryFilter;
use recipe_swipe::engine::{SessionConfig, SwipeOutcome, SwipeSession};
use recipe_swipe::store::{load_recipes_from_csv, load_recipes_from_json, RemoteStore};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

// Bearer token for the remote recipe store, if the deployment uses one.
const REMOTE_TOKEN_ENV_VAR: &str = "RECIPE_STORE_TOKEN";

async fn load_catalog(
    catalog_path: Option<&str>,
    remote_url: Option<&str>,
) -> Result<RecipeCatalog> {
    let records = match (catalog_path, remote_url) {
        (_, Some(url)) => {
            println!("Fetching recipes from remote store at {}...", url);
            let mut store = RemoteStore::new(url);
            if env::var(REMOTE_TOKEN_ENV_VAR).is_ok() {
                store = store.with_token_env(REMOTE_TOKEN_ENV_VAR);
            }
            store
                .fetch_all()
                .await
                .with_context(|| format!("Failed to fetch recipes from '{}'", url))?
        }
        (Some(path), None) => {
            println!("Loading recipe catalog from {}...", path);
            let path = Path::new(path);
            match path.extension().and_then(|ext| ext.to_str()) {
                Some("csv") => load_recipes_from_csv(path)?,
                Some("json") => load_recipes_from_json(path)?,
                other => {
                    return Err(anyhow!(
                        "Unsupported catalog file extension: {:?} (expected .csv or .json)",
                        other
                    ))
                }
            }
        }
        (None, None) => {
            return Err(anyhow!("Provide either --catalog <file> or --remote-url <url>"))
        }
    };

    RecipeCatalog::from_records(records).context("Failed to build recipe catalog")
}

fn parse_preferences(
    meal_type: Option<&str>,
    taste: Option<&str>,
    max_cook_time: Option<u32>,
) -> Result<Preferences> {
    Ok(Preferences {
        meal_type: meal_type.map(MealType::parse).transpose()?,
        taste_profile: taste.map(TasteProfile::parse).transpose()?,
        max_cook_time,
    })
}

fn read_command() -> Option<String> {
    print!("> ");
    io::stdout().flush().ok()?;
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) => None, // EOF
        Ok(_) => Some(line.trim().to_lowercase()),
        Err(_) => None,
    }
}

fn print_outcome(outcome: &SwipeOutcome) {
    match outcome {
        SwipeOutcome::Ready { recipes, .. } => {
            println!("\nReady to cook! Your ingredients fully cover:");
            for recipe in recipes {
                let ingredients: Vec<&str> =
                    recipe.ingredients.iter().map(|i| i.as_str()).collect();
                println!(
                    "  - {} ({} min, {}): {}",
                    recipe.title,
                    recipe.cook_time_minutes,
                    recipe.appliance,
                    ingredients.join(", ")
                );
            }
            println!("Type 'r' to start over or 'q' to quit.");
        }
        SwipeOutcome::Narrowing {
            candidates_count, ..
        } => {
            println!("  {} recipes still in play.", candidates_count);
        }
        SwipeOutcome::DeadEnd => {
            println!("\nDead end: no recipe contains everything you accepted.");
            println!("Type 'r' to start over or 'q' to quit.");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok(); // Load .env for the remote store token

    let cli_args = parse_args();

    let catalog = load_catalog(cli_args.catalog.as_deref(), cli_args.remote_url.as_deref()).await?;
    println!("Catalog loaded: {} recipes.", catalog.len());
    if catalog.is_empty() {
        println!("The catalog is empty; nothing to swipe on.");
        return Ok(());
    }

    let preferences = parse_preferences(
        cli_args.meal_type.as_deref(),
        cli_args.taste.as_deref(),
        cli_args.max_cook_time,
    )?;

    let config = SessionConfig {
        broad_threshold: cli_args.broad_threshold,
        restrictions: cli_args.restrictions.clone(),
        ..Default::default()
    };

    let mut session = SwipeSession::new(Arc::new(catalog), preferences, config);
    if !cli_args.restrictions.is_empty() {
        // An unreadable table degrades to the built-in one; restrictions
        // never block the session outright.
        let filter = match cli_args.dietary_table.as_deref() {
            Some(path) => DietaryFilter::from_json_file(Path::new(path)).unwrap_or_else(|e| {
                eprintln!("Warning: {}. Falling back to the built-in dietary table.", e);
                DietaryFilter::builtin()
            }),
            None => DietaryFilter::builtin(),
        };
        session = session.with_dietary(filter);
    }

    println!("\nSwipe on ingredients: [y]es / [n]o / [r]eset / [q]uit");
    loop {
        match session.current_suggestion() {
            Some(suggestion) => {
                println!(
                    "\nHow about: {}? (helps complete {} recipes)",
                    suggestion.ingredient, suggestion.recipe_matches
                );
                let Some(command) = read_command() else { break };
                match command.as_str() {
                    "y" | "yes" => {
                        let outcome = session.accept_ingredient(suggestion.ingredient.as_str());
                        print_outcome(&outcome);
                    }
                    "n" | "no" => {
                        let outcome = session.reject_ingredient(suggestion.ingredient.as_str());
                        print_outcome(&outcome);
                    }
                    "r" | "reset" => {
                        session.reset();
                        println!("Session reset.");
                    }
                    "q" | "quit" => break,
                    other => println!("Unrecognized input '{}'; use y/n/r/q.", other),
                }
            }
            None => {
                let snapshot = session.state();
                if snapshot.candidates_count == 0 {
                    println!("\nDead end: no recipe matches your swipes.");
                } else {
                    println!("\nNothing left to suggest.");
                }
                println!(
                    "Accepted: [{}]  Rejected: [{}]",
                    snapshot.accepted.join(", "),
                    snapshot.rejected.join(", ")
                );
                println!("Type 'r' to start over or 'q' to quit.");
                let Some(command) = read_command() else { break };
                match command.as_str() {
                    "r" | "reset" => {
                        session.reset();
                        println!("Session reset.");
                    }
                    "q" | "quit" => break,
                    _ => {}
                }
            }
        }
    }

    Ok(())
}
