use thiserror::Error;

/// Failures that end a chat turn. Provider failures have already been
/// translated to a displayable message by the time they get here.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChatError {
    #[error("Failed to classify message: {0}")]
    Classification(String),

    #[error("Failed to get response from OpenAI: {0}!")]
    Upstream(String),

    #[error("Failed to render prompt: {0}")]
    Template(String),
}

pub type ChatResult<T> = Result<T, ChatError>;
