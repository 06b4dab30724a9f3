pub mod catalog;
pub mod cli;
pub mod dietary;
pub mod engine;
pub mod ingredient;
pub mod store;
