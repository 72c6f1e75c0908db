use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::base::{ChatRequestSpec, CompletionResult, Provider, ServiceResponse, Usage};
use super::configs::OpenAiProviderConfig;
use super::errors::{ProviderError, ProviderErrorKind};
use super::pricing::estimate_cost;
use super::stream::text_stream;
use super::utils::{create_request, get_usage, openai_response_to_choice};

pub struct OpenAiProvider {
    client: Client,
    config: OpenAiProviderConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiProviderConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, config })
    }

    async fn post(&self, payload: &Value) -> Result<Response, ProviderError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ProviderError::from_response(status, &body))
        }
    }

    /// Convert the usage into the display currency, logging each leg
    fn estimate_cost(&self, model: &str, usage: &Usage) -> Option<f64> {
        let Some(cost) = estimate_cost(model, usage) else {
            warn!(model, "no price known for model, skipping cost estimate");
            return None;
        };
        let multiplier = self.config.currency_multiplier;

        info!(
            tokens = usage.prompt_tokens,
            usd = cost.prompt,
            converted = cost.prompt * multiplier,
            "chat prompt cost"
        );
        info!(
            tokens = usage.completion_tokens,
            usd = cost.completion,
            converted = cost.completion * multiplier,
            "chat completion cost"
        );
        info!(
            tokens = usage.total_tokens,
            usd = cost.total,
            converted = cost.converted(multiplier),
            "chat total cost"
        );

        Some(cost.converted(multiplier))
    }

    async fn complete(&self, spec: ChatRequestSpec) -> Result<CompletionResult, ProviderError> {
        info!(model = %spec.model, stream = spec.stream, "openai chat");

        let payload = create_request(&spec).map_err(|e| ProviderError::unknown(e.to_string()))?;
        debug!(%payload, "openai chat request");

        let response = self.post(&payload).await?;

        if spec.stream {
            info!("chat completion streaming response");
            return Ok(CompletionResult::stream(text_stream(response.bytes_stream())));
        }

        let data: Value = response.json().await?;

        if let Some(error) = data.get("error") {
            return Err(ProviderError::new(ProviderErrorKind::Api, error.to_string()));
        }

        let choice =
            openai_response_to_choice(&data).map_err(|e| ProviderError::unknown(e.to_string()))?;
        let usage = get_usage(&data).ok();
        let cost = usage.and_then(|usage| self.estimate_cost(&spec.model, &usage));

        debug!(
            id = data.get("id").and_then(|id| id.as_str()),
            completion = %data,
            cost,
            "chat completion response"
        );

        Ok(CompletionResult::choice(choice, usage, cost))
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn create_chat(&self, spec: ChatRequestSpec) -> ServiceResponse<CompletionResult> {
        match self.complete(spec).await {
            Ok(result) => ServiceResponse::success(result),
            Err(e) => {
                error!(kind = %e.kind, detail = %e.detail, "{}", e.message());
                ServiceResponse::failure(e)
            }
        }
    }
}
