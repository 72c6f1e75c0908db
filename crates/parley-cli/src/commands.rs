pub mod agents;
pub mod chat;
pub mod title;

use anyhow::Result;
use parley::prompt_builder::PromptBuilder;
use parley::providers::openai::OpenAiProvider;
use parley::router::Router;
use std::sync::Arc;

use crate::agents::FileAgentStore;
use crate::configuration::Settings;

/// Wire the configured provider, routing table and agent catalog into a router
pub fn build_router(settings: &Settings, store: Option<Arc<FileAgentStore>>) -> Result<Router> {
    let provider = Arc::new(OpenAiProvider::new(settings.provider_config())?);
    let builder = match store {
        Some(store) => PromptBuilder::with_store(store),
        None => PromptBuilder::new(),
    };

    let mut router = Router::new(provider)
        .with_builder(builder)
        .with_models(settings.model_table())
        .with_lightweight_model(&settings.routing.lightweight_model);
    if let Some(category) = settings.classification_fallback()? {
        router = router.with_classification_fallback(category);
    }
    Ok(router)
}
