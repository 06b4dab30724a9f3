pub mod file;
pub mod remote;

pub use file::{load_recipes_from_csv, load_recipes_from_json};
pub use remote::{RemoteStore, StoreError};
