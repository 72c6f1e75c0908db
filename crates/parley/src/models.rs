//! These models represent the values passed through a chat turn
//!
//! There are a few related formats we need to interact with:
//! - the per-turn request handed to us by the consumer (user, agent, message)
//! - prompt fragments, assembled by the builder and sent to the LLM in order
//! - openai messages/tools, sent to and received from the completion provider
//!
//! We always immediately convert the provider format into these internal structs
//! using the helpers in `providers::utils`, so nothing above the gateway handles
//! raw provider json.
pub mod category;
pub mod message;
pub mod request;
pub mod role;
pub mod tool;
