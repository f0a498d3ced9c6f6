use thiserror::Error;

/// Prefix shared by every setting read from the environment.
pub const ENV_PREFIX: &str = "AZURE_AI";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Invalid project endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error(
        "Invalid agent name '{name}': must start with a letter or digit, contain only \
         letters, digits and '-', and be at most 63 characters"
    )]
    InvalidAgentName { name: String },

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// Map a settings field back to the environment variable it is read from.
pub fn to_env_var(field: &str) -> String {
    format!("{}_{}", ENV_PREFIX, field.to_uppercase().replace('.', "_"))
}
