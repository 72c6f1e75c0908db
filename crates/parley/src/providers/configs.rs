use std::time::Duration;

pub const OPENAI_HOST: &str = "https://api.openai.com";

/// Seconds before a completion request is abandoned
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// USD to display currency (rupiah)
pub const DEFAULT_CURRENCY_MULTIPLIER: f64 = 15000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiProviderConfig {
    pub host: String,
    pub api_key: String,
    pub timeout: Duration,
    pub currency_multiplier: f64,
}

impl OpenAiProviderConfig {
    pub fn new<S: Into<String>>(api_key: S) -> Self {
        Self {
            host: OPENAI_HOST.to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            currency_multiplier: DEFAULT_CURRENCY_MULTIPLIER,
        }
    }

    pub fn with_host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_currency_multiplier(mut self, multiplier: f64) -> Self {
        self.currency_multiplier = multiplier;
        self
    }
}
