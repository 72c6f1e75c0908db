use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// The cheap model used for classification, titles and as the routing fallback
pub const LIGHTWEIGHT_MODEL: &str = "gpt-4o-mini";

/// The model used for messages that need deeper reasoning
pub const DEEP_MODEL: &str = "o1-preview";

/// Closed set of buckets an inbound message can be classified into
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    Greetings,
    SimpleConversation,
    DeepConversation,
}

impl Category {
    /// Human readable description shown to the classifier
    pub fn description(&self) -> &'static str {
        match self {
            Category::Greetings => "For greeting messages like 'Hello', 'Hi', etc.",
            Category::SimpleConversation => {
                "For messages that are easy to understand and casual."
            }
            Category::DeepConversation => {
                "For messages that are asking about deep topics in any field or asking for opinion."
            }
        }
    }

    /// Every category name, in declaration order
    pub fn names() -> Vec<String> {
        Category::iter().map(|c| c.to_string()).collect()
    }
}

/// Maps each category to the model tier that answers it
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryModelTable {
    models: HashMap<Category, String>,
}

impl CategoryModelTable {
    /// A table with no entries; every lookup falls back to the caller's default
    pub fn empty() -> Self {
        Self {
            models: HashMap::new(),
        }
    }

    /// Set the model for a category, replacing any previous entry
    pub fn with_model<S: Into<String>>(mut self, category: Category, model: S) -> Self {
        self.models.insert(category, model.into());
        self
    }

    pub fn get(&self, category: Category) -> Option<&str> {
        self.models.get(&category).map(String::as_str)
    }

    /// Categories that have no model assigned
    pub fn missing(&self) -> Vec<Category> {
        Category::iter()
            .filter(|c| !self.models.contains_key(c))
            .collect()
    }
}

impl Default for CategoryModelTable {
    fn default() -> Self {
        Self::empty()
            .with_model(Category::Greetings, LIGHTWEIGHT_MODEL)
            .with_model(Category::SimpleConversation, LIGHTWEIGHT_MODEL)
            .with_model(Category::DeepConversation, DEEP_MODEL)
    }
}
