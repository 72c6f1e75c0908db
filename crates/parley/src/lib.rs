pub mod classifier;
pub mod errors;
pub mod models;
pub mod prompt_builder;
pub mod prompt_template;
pub mod providers;
pub mod router;
pub mod store;
