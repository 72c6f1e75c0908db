pub mod base;
pub mod configs;
pub mod errors;
pub mod openai;
pub mod pricing;
pub mod stream;
pub mod utils;

#[cfg(test)]
pub mod mock;
