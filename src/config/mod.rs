mod error;

pub use error::{to_env_var, ConfigError, ENV_PREFIX};

use config::{Config, Environment};
use regex::Regex;
use serde::Deserialize;
use url::Url;

pub const DEFAULT_API_VERSION: &str = "2025-11-15-preview";
pub const DEFAULT_AGENT_NAME: &str = "sales-data-analyst";

/// Settings for one analysis run, read once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Project endpoint, e.g. `https://<resource>.services.ai.azure.com/api/projects/<project>`.
    pub project_endpoint: String,
    /// Model deployment the agent runs on.
    pub model_deployment_name: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_agent_name")]
    pub agent_name: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("api_version", default_api_version())?
            .set_default("agent_name", default_agent_name())?
            .add_source(Environment::with_prefix(ENV_PREFIX).prefix_separator("_"))
            .build()?;

        let settings: Self = match config.try_deserialize() {
            Ok(settings) => settings,
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                let error_str = err.to_string();
                if error_str.starts_with("missing field") {
                    // "missing field `project_endpoint`"
                    let field = error_str
                        .trim_start_matches("missing field `")
                        .trim_end_matches('`');
                    return Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    });
                } else if let config::ConfigError::NotFound(field) = &err {
                    return Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    });
                }
                return Err(ConfigError::Other(err));
            }
        };

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("project_endpoint", &self.project_endpoint),
            ("model_deployment_name", &self.model_deployment_name),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingEnvVar {
                    env_var: to_env_var(field),
                });
            }
        }

        let url = Url::parse(&self.project_endpoint).map_err(|e| ConfigError::InvalidEndpoint {
            endpoint: self.project_endpoint.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEndpoint {
                endpoint: self.project_endpoint.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        validate_agent_name(&self.agent_name)
    }
}

/// Agent names become a URL path segment, so only letters, digits and `-` are allowed.
pub fn validate_agent_name(name: &str) -> Result<(), ConfigError> {
    let re = Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9-]{0,62}$").unwrap();
    if re.is_match(name) {
        Ok(())
    } else {
        Err(ConfigError::InvalidAgentName {
            name: name.to_string(),
        })
    }
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_agent_name() -> String {
    DEFAULT_AGENT_NAME.to_string()
}
