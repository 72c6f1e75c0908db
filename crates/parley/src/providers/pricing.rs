use lazy_static::lazy_static;
use std::collections::HashMap;

use super::base::Usage;

/// USD per 1000 tokens for each leg of a completion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPrice {
    pub prompt: f64,
    pub completion: f64,
}

const fn price(prompt: f64, completion: f64) -> ModelPrice {
    ModelPrice { prompt, completion }
}

lazy_static! {
    static ref MODEL_PRICES: HashMap<&'static str, ModelPrice> = HashMap::from([
        ("gpt-3.5-turbo", price(0.0015, 0.002)),
        ("gpt-3.5-turbo-0125", price(0.0005, 0.0015)),
        ("gpt-3.5-turbo-0613", price(0.0015, 0.002)),
        ("gpt-3.5-turbo-1106", price(0.0010, 0.0020)),
        ("gpt-3.5-turbo-16k-0613", price(0.003, 0.004)),
        ("gpt-4", price(0.03, 0.06)),
        ("gpt-4-32k", price(0.06, 0.12)),
        ("gpt-4-turbo", price(0.01, 0.03)),
        ("gpt-4-turbo-2024-04-09", price(0.01, 0.03)),
        ("gpt-4-turbo-32k", price(0.03, 0.06)),
        ("gpt-4o", price(0.005, 0.015)),
        ("gpt-4o-2024-05-13", price(0.005, 0.015)),
        ("gpt-4o-2024-08-06", price(0.0025, 0.01)),
        ("gpt-4o-mini", price(0.00015, 0.0006)),
        ("gpt-4o-mini-2024-07-18", price(0.00015, 0.0006)),
        ("o1-preview", price(0.015, 0.06)),
        ("o1-preview-2024-09-12", price(0.015, 0.06)),
        ("o1-mini", price(0.003, 0.012)),
        ("o1-mini-2024-09-12", price(0.003, 0.012)),
    ]);
}

pub fn model_price(model: &str) -> Option<ModelPrice> {
    MODEL_PRICES.get(model).copied()
}

/// Cost of one completion in USD
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostBreakdown {
    pub prompt: f64,
    pub completion: f64,
    pub total: f64,
}

impl CostBreakdown {
    /// Total converted to the display currency
    pub fn converted(&self, multiplier: f64) -> f64 {
        self.total * multiplier
    }
}

/// Price the usage of a completion, `None` when the model is not in the table
pub fn estimate_cost(model: &str, usage: &Usage) -> Option<CostBreakdown> {
    let price = model_price(model)?;
    let prompt = usage.prompt_tokens.unwrap_or(0) as f64 / 1000.0 * price.prompt;
    let completion = usage.completion_tokens.unwrap_or(0) as f64 / 1000.0 * price.completion;
    Some(CostBreakdown {
        prompt,
        completion,
        total: prompt + completion,
    })
}
