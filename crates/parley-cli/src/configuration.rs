use crate::error::{to_env_var, ConfigError, ENV_PREFIX};
use config::{Config, Environment};
use parley::models::category::{Category, CategoryModelTable, DEEP_MODEL, LIGHTWEIGHT_MODEL};
use parley::providers::configs::{
    OpenAiProviderConfig, DEFAULT_CURRENCY_MULTIPLIER, DEFAULT_TIMEOUT_SECS, OPENAI_HOST,
};
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_openai_host")]
    pub host: String,
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Which model answers each category
///
/// An empty model name leaves the category unmapped, so its turns use the
/// lightweight model.
#[derive(Debug, Deserialize)]
pub struct RoutingSettings {
    #[serde(default = "default_lightweight_model")]
    pub lightweight_model: String,
    #[serde(default = "default_lightweight_model")]
    pub greetings: String,
    #[serde(default = "default_lightweight_model")]
    pub simple_conversation: String,
    #[serde(default = "default_deep_model")]
    pub deep_conversation: String,
    #[serde(default)]
    pub classification_fallback: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CostSettings {
    #[serde(default = "default_currency_multiplier")]
    pub currency_multiplier: f64,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub provider: ProviderSettings,
    pub routing: RoutingSettings,
    pub cost: CostSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("provider.host", default_openai_host())?
            .set_default("provider.timeout_secs", default_timeout_secs())?
            .set_default("routing.lightweight_model", default_lightweight_model())?
            .set_default("routing.greetings", default_lightweight_model())?
            .set_default("routing.simple_conversation", default_lightweight_model())?
            .set_default("routing.deep_conversation", default_deep_model())?
            .set_default("cost.currency_multiplier", default_currency_multiplier())?
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let result: Result<Self, config::ConfigError> = config.try_deserialize();

        match result {
            Ok(settings) => {
                settings.classification_fallback()?;
                Ok(settings)
            }
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                let error_str = err.to_string();
                if error_str.contains("missing field") {
                    // "missing field `api_key`"
                    let field = error_str
                        .split('`')
                        .nth(1)
                        .unwrap_or(error_str.as_str());
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else if let config::ConfigError::NotFound(field) = &err {
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }

    pub fn provider_config(&self) -> OpenAiProviderConfig {
        OpenAiProviderConfig::new(&self.provider.api_key)
            .with_host(&self.provider.host)
            .with_timeout(Duration::from_secs(self.provider.timeout_secs))
            .with_currency_multiplier(self.cost.currency_multiplier)
    }

    pub fn model_table(&self) -> CategoryModelTable {
        let routes = [
            (Category::Greetings, &self.routing.greetings),
            (Category::SimpleConversation, &self.routing.simple_conversation),
            (Category::DeepConversation, &self.routing.deep_conversation),
        ];

        routes
            .into_iter()
            .filter(|(_, model)| !model.trim().is_empty())
            .fold(CategoryModelTable::empty(), |table, (category, model)| {
                table.with_model(category, model.trim())
            })
    }

    pub fn classification_fallback(&self) -> Result<Option<Category>, ConfigError> {
        match self.routing.classification_fallback.as_deref() {
            None | Some("") => Ok(None),
            Some(name) => Category::from_str(name)
                .map(Some)
                .map_err(|_| ConfigError::InvalidValue {
                    env_var: to_env_var("routing.classification_fallback"),
                    value: name.to_string(),
                }),
        }
    }
}

fn default_openai_host() -> String {
    OPENAI_HOST.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_lightweight_model() -> String {
    LIGHTWEIGHT_MODEL.to_string()
}

fn default_deep_model() -> String {
    DEEP_MODEL.to_string()
}

fn default_currency_multiplier() -> f64 {
    DEFAULT_CURRENCY_MULTIPLIER
}
