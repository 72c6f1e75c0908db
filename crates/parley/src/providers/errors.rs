use reqwest::StatusCode;
use serde_json::Value;
use strum_macros::Display;
use thiserror::Error;

/// Closed set of failures the completion provider can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ProviderErrorKind {
    Api,
    Authentication,
    Connection,
    BadRequest,
    InternalServer,
    NotFound,
    UnprocessableEntity,
    RateLimit,
    Timeout,
    Unknown,
}

impl ProviderErrorKind {
    /// Displayable message for the known kinds
    fn fixed_message(&self) -> Option<&'static str> {
        let message = match self {
            ProviderErrorKind::Api => "OpenAI API returned an API Error.",
            ProviderErrorKind::Authentication => "OpenAI API returned an Authentication Error.",
            ProviderErrorKind::Connection => "OpenAI API returned an API Connection Error.",
            ProviderErrorKind::BadRequest => "OpenAI API returned a Bad Request Error.",
            ProviderErrorKind::InternalServer => "OpenAI API returned an Internal Server Error.",
            ProviderErrorKind::NotFound => "OpenAI API returned a Not Found Error.",
            ProviderErrorKind::UnprocessableEntity => {
                "OpenAI API returned an Unprocessable Entity Error."
            }
            ProviderErrorKind::RateLimit => "OpenAI API returned a Rate Limit Error.",
            ProviderErrorKind::Timeout => "OpenAI API returned a Timeout.",
            ProviderErrorKind::Unknown => return None,
        };
        Some(message)
    }

    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            400 => ProviderErrorKind::BadRequest,
            401 => ProviderErrorKind::Authentication,
            404 => ProviderErrorKind::NotFound,
            422 => ProviderErrorKind::UnprocessableEntity,
            429 => ProviderErrorKind::RateLimit,
            code if code >= 500 => ProviderErrorKind::InternalServer,
            _ => ProviderErrorKind::Api,
        }
    }
}

/// A provider failure, already classified
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}", self.message())]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    /// Raw error text from the provider or transport
    pub detail: String,
}

impl ProviderError {
    pub fn new<S: Into<String>>(kind: ProviderErrorKind, detail: S) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn unknown<S: Into<String>>(detail: S) -> Self {
        Self::new(ProviderErrorKind::Unknown, detail)
    }

    /// Displayable message; unmapped failures embed the raw error text
    pub fn message(&self) -> String {
        match self.kind.fixed_message() {
            Some(message) => message.to_string(),
            None => format!("[OPENAI] service error: {}", self.detail),
        }
    }

    /// Classify a non-success HTTP response
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let detail = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
                    .map(String::from)
            })
            .unwrap_or_else(|| format!("{}: {}", status, body));
        Self::new(ProviderErrorKind::from_status(status), detail)
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ProviderErrorKind::Timeout
        } else if err.is_connect() {
            ProviderErrorKind::Connection
        } else if let Some(status) = err.status() {
            ProviderErrorKind::from_status(status)
        } else {
            ProviderErrorKind::Unknown
        };
        Self::new(kind, err.to_string())
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::unknown(err.to_string())
    }
}
