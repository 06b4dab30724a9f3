use clap::Parser;

use crate::engine::selector::BROAD_STAGE_THRESHOLD;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the recipe catalog file (.csv or .json)
    #[arg(short, long)]
    pub catalog: Option<String>,

    /// Base URL of a remote recipe store serving JSON
    #[arg(long)]
    pub remote_url: Option<String>,

    /// Only consider recipes of this meal type (breakfast, lunch, dinner)
    #[arg(long)]
    pub meal_type: Option<String>,

    /// Only consider recipes with this taste profile (sweet, savory)
    #[arg(long)]
    pub taste: Option<String>,

    /// Only consider recipes at or under this cook time, in minutes
    #[arg(long)]
    pub max_cook_time: Option<u32>,

    /// Accepted-ingredient count at which suggestions switch from broad to specific
    #[arg(long, default_value_t = BROAD_STAGE_THRESHOLD)]
    pub broad_threshold: usize,

    /// Dietary restriction tag to exclude from suggestions (repeatable)
    #[arg(long = "restriction")]
    pub restrictions: Vec<String>,

    /// Path to a JSON dietary restriction table (falls back to the built-in table)
    #[arg(long)]
    pub dietary_table: Option<String>,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
