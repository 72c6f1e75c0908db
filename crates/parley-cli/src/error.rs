use thiserror::Error;

pub const ENV_PREFIX: &str = "PARLEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required configuration, set the {env_var} environment variable")]
    MissingEnvVar { env_var: String },
    #[error("Invalid value '{value}' for {env_var}")]
    InvalidValue { env_var: String, value: String },
    #[error(transparent)]
    Other(#[from] config::ConfigError),
}

/// Map a settings key to the environment variable that sets it
///
/// Serde only reports the leaf name of a missing field, so required leaves
/// are qualified with their section first.
pub fn to_env_var(field: &str) -> String {
    let path = match field {
        "api_key" => "provider.api_key",
        other => other,
    };
    format!("{}_{}", ENV_PREFIX, path.replace('.', "__").to_uppercase())
}
