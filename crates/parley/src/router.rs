use std::sync::Arc;
use tracing::{info, warn};

use crate::classifier::Classifier;
use crate::errors::{ChatError, ChatResult};
use crate::models::category::{Category, CategoryModelTable, LIGHTWEIGHT_MODEL};
use crate::models::message::PromptFragment;
use crate::models::request::ChatRequest;
use crate::prompt_builder::{PromptBuilder, NEW_MESSAGE_NAME};
use crate::prompt_template::load_prompt_file;
use crate::providers::base::{ChatRequestSpec, CompletionPayload, Provider};

/// Router ties classification, prompt assembly and completion together for one turn
pub struct Router {
    provider: Arc<dyn Provider>,
    classifier: Classifier,
    builder: PromptBuilder,
    models: CategoryModelTable,
    lightweight_model: String,
    classification_fallback: Option<Category>,
}

impl Router {
    /// Create a router with the default category table and the built-in persona
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            classifier: Classifier::new(provider.clone()),
            provider,
            builder: PromptBuilder::new(),
            models: CategoryModelTable::default(),
            lightweight_model: LIGHTWEIGHT_MODEL.to_string(),
            classification_fallback: None,
        }
    }

    pub fn with_builder(mut self, builder: PromptBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn with_models(mut self, models: CategoryModelTable) -> Self {
        for category in models.missing() {
            warn!(category = %category, "category has no model, requests will use the lightweight model");
        }
        self.models = models;
        self
    }

    /// Model used for classification and titles
    pub fn with_lightweight_model<S: Into<String>>(mut self, model: S) -> Self {
        let model = model.into();
        self.classifier = Classifier::new(self.provider.clone()).with_model(&model);
        self.lightweight_model = model;
        self
    }

    /// Answer as this category when classification fails instead of ending the turn
    pub fn with_classification_fallback(mut self, category: Category) -> Self {
        self.classification_fallback = Some(category);
        self
    }

    /// The model that answers a category, falling back to the lightweight model
    pub fn model_for(&self, category: Category) -> String {
        match self.models.get(category) {
            Some(model) => model.to_string(),
            None => {
                warn!(
                    category = %category,
                    fallback = %self.lightweight_model,
                    "no model configured for category"
                );
                self.lightweight_model.clone()
            }
        }
    }

    async fn categorize(&self, request: &ChatRequest) -> ChatResult<Category> {
        let user_id = request.user_id();
        match self.classifier.classify(&request.message, user_id.as_deref()).await {
            Ok(category) => Ok(category),
            Err(ChatError::Classification(reason)) => match self.classification_fallback {
                Some(fallback) => {
                    warn!(%reason, category = %fallback, "classification failed, using fallback");
                    Ok(fallback)
                }
                None => Err(ChatError::Classification(reason)),
            },
            Err(e) => Err(e),
        }
    }

    /// Answer one user turn
    ///
    /// Returns a stream of text deltas when the request asks for streaming,
    /// otherwise the first choice of the completion.
    pub async fn chat(&self, request: &ChatRequest) -> ChatResult<CompletionPayload> {
        let category = self.categorize(request).await?;
        let model = self.model_for(category);
        let prompts = self.builder.build_prompt(request, category).await?;

        info!(category = %category, model = %model, "routing chat");

        let spec = ChatRequestSpec::new(model, prompts)
            .with_user(request.user_id())
            .with_stream(request.stream_requested);

        let response = self.provider.create_chat(spec).await;
        if response.failed {
            return Err(ChatError::Upstream(response.message));
        }
        let result = response
            .into_result()
            .map_err(|e| ChatError::Upstream(e.message()))?;

        Ok(result.completion)
    }

    /// Derive a short title for a new conversation from its first message
    pub async fn define_conversation_title(&self, message: &str) -> ChatResult<String> {
        let profile = load_prompt_file("title.md", &serde_json::json!({}))
            .map_err(|e| ChatError::Template(e.to_string()))?;
        let prompts = vec![
            PromptFragment::system("profile", profile),
            PromptFragment::user(
                NEW_MESSAGE_NAME,
                format!("Determine the title of this message: {}", message),
            ),
        ];

        let response = self
            .provider
            .create_chat(ChatRequestSpec::new(&self.lightweight_model, prompts))
            .await;
        if response.failed {
            return Err(ChatError::Upstream(response.message));
        }
        let result = response
            .into_result()
            .map_err(|e| ChatError::Upstream(e.message()))?;

        match result.completion {
            CompletionPayload::Choice(choice) => choice
                .message
                .text()
                .map(|title| title.replace('"', ""))
                .ok_or_else(|| ChatError::Upstream("the title completion had no text".to_string())),
            CompletionPayload::Stream(_) => Err(ChatError::Upstream(
                "expected a structured completion, got a stream".to_string(),
            )),
        }
    }
}
