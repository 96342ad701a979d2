//! Configuration management.
//!
//! Configuration is read from environment variables (a `.env` file is loaded
//! by `main` first):
//! - `HOST` / `PORT` - Optional. Bind address. Defaults to `127.0.0.1:3030`.
//! - `ANTHROPIC_API_KEY` - Optional. Use the Anthropic API directly.
//! - `GCP_PROJECT_ID` - Required unless `ANTHROPIC_API_KEY` and `GRAPHQL_ENDPOINT` are both set.
//! - `GCP_LOCATION` - Optional. Defaults to `us-central1`.
//! - `CLAUDE_MODEL` - Optional. `haiku-4-5` (default) or `sonnet-4-5`.
//! - `MAX_TOKENS` - Optional. Defaults to `1024`.
//! - `CLAUDE_TEMPERATURE` - Optional. Sampling temperature; the model default when unset.
//! - `GRAPHQL_ENDPOINT` - Optional. Explicit GraphQL URL.
//! - `DATACONNECT_SERVICE_ID` - Required when `GRAPHQL_ENDPOINT` is not set.
//! - `GRAPHQL_AUTH` - Optional. `none` or `adc`.
//! - `AGENT_MAX_ITERATIONS` - Optional. Defaults to `10`.
//! - `REQUEST_TIMEOUT_SECS` - Optional. Defaults to `120`.
//! - `SYSTEM_PROMPT` - Optional. Replaces the built-in system instruction.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::graphql::{dataconnect_url, GraphqlAuth};
use crate::llm::agent::DEFAULT_MAX_ITERATIONS;
use crate::llm::claude::{ClaudeEndpoint, ClaudeModel};
use crate::llm::core::config::GenerationConfig;
use crate::prompt::SYSTEM_PROMPT;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3030;
const DEFAULT_LOCATION: &str = "us-central1";
const DEFAULT_MAX_TOKENS: u32 = 1024;
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Where the model is reached and which model is used
#[derive(Debug, Clone)]
pub struct ClaudeConfig {
    pub endpoint: ClaudeEndpoint,
    pub model: ClaudeModel,
}

/// Data backend location and authentication
#[derive(Debug, Clone)]
pub struct GraphqlConfig {
    pub endpoint: String,
    pub auth: GraphqlAuth,
}

/// Per-request agent settings
#[derive(Debug, Clone)]
pub struct AgentSettings {
    /// Generation parameters for every model call
    pub generation: GenerationConfig,

    /// System instruction
    pub system_prompt: String,

    /// Cap on model calls per request
    pub max_iterations: usize,

    /// Limit on the whole request
    pub request_timeout: Duration,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::new(DEFAULT_MAX_TOKENS),
            system_prompt: SYSTEM_PROMPT.to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    pub claude: ClaudeConfig,

    pub graphql: GraphqlConfig,

    pub agent: AgentSettings,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a required variable is missing or a value
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host = var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or("PORT", var("PORT"), DEFAULT_PORT)?;

        let project_id = var("GCP_PROJECT_ID");
        let location = var("GCP_LOCATION").unwrap_or_else(|| DEFAULT_LOCATION.to_string());

        let model = parse_or("CLAUDE_MODEL", var("CLAUDE_MODEL"), ClaudeModel::Haiku45)?;
        let endpoint = match (var("ANTHROPIC_API_KEY"), &project_id) {
            (Some(api_key), _) => ClaudeEndpoint::Anthropic { api_key },
            (None, Some(project_id)) => ClaudeEndpoint::Vertex {
                project_id: project_id.clone(),
                location: location.clone(),
            },
            (None, None) => {
                return Err(ConfigError::MissingEnvVar(
                    "ANTHROPIC_API_KEY or GCP_PROJECT_ID".to_string(),
                ))
            }
        };

        let graphql = match var("GRAPHQL_ENDPOINT") {
            Some(endpoint) => GraphqlConfig {
                endpoint,
                auth: parse_auth(var("GRAPHQL_AUTH"), GraphqlAuth::None)?,
            },
            None => {
                let service_id = var("DATACONNECT_SERVICE_ID").ok_or_else(|| {
                    ConfigError::MissingEnvVar(
                        "GRAPHQL_ENDPOINT or DATACONNECT_SERVICE_ID".to_string(),
                    )
                })?;
                let project_id = project_id
                    .as_deref()
                    .ok_or_else(|| ConfigError::MissingEnvVar("GCP_PROJECT_ID".to_string()))?;
                GraphqlConfig {
                    endpoint: dataconnect_url(project_id, &location, &service_id),
                    auth: parse_auth(var("GRAPHQL_AUTH"), GraphqlAuth::Adc)?,
                }
            }
        };

        let max_tokens = parse_or("MAX_TOKENS", var("MAX_TOKENS"), DEFAULT_MAX_TOKENS)?;
        let max_iterations = parse_or(
            "AGENT_MAX_ITERATIONS",
            var("AGENT_MAX_ITERATIONS"),
            DEFAULT_MAX_ITERATIONS,
        )?;
        if max_iterations == 0 {
            return Err(ConfigError::InvalidValue(
                "AGENT_MAX_ITERATIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let timeout_secs = parse_or(
            "REQUEST_TIMEOUT_SECS",
            var("REQUEST_TIMEOUT_SECS"),
            DEFAULT_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "REQUEST_TIMEOUT_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let mut generation = GenerationConfig::new(max_tokens);
        if let Some(raw) = var("CLAUDE_TEMPERATURE") {
            let temperature: f32 = parse_or("CLAUDE_TEMPERATURE", Some(raw), 1.0)?;
            if !(0.0..=1.0).contains(&temperature) {
                return Err(ConfigError::InvalidValue(
                    "CLAUDE_TEMPERATURE".to_string(),
                    "must be between 0.0 and 1.0".to_string(),
                ));
            }
            generation = generation.with_temperature(temperature);
        }

        let agent = AgentSettings {
            generation,
            system_prompt: var("SYSTEM_PROMPT").unwrap_or_else(|| SYSTEM_PROMPT.to_string()),
            max_iterations,
            request_timeout: Duration::from_secs(timeout_secs),
        };

        Ok(Self {
            host,
            port,
            claude: ClaudeConfig { endpoint, model },
            graphql,
            agent,
        })
    }

    /// `host:port` for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(v) => v
            .parse()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), format!("{}", e))),
        None => Ok(default),
    }
}

fn parse_auth(value: Option<String>, default: GraphqlAuth) -> Result<GraphqlAuth, ConfigError> {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => Ok(default),
        Some("none") => Ok(GraphqlAuth::None),
        Some("adc") => Ok(GraphqlAuth::Adc),
        Some(other) => Err(ConfigError::InvalidValue(
            "GRAPHQL_AUTH".to_string(),
            format!("expected 'none' or 'adc', got: {}", other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_vertex_with_dataconnect_defaults() {
        let config = config(&[
            ("GCP_PROJECT_ID", "demo"),
            ("DATACONNECT_SERVICE_ID", "matchday"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:3030");
        assert_eq!(
            config.claude.endpoint,
            ClaudeEndpoint::Vertex {
                project_id: "demo".to_string(),
                location: "us-central1".to_string(),
            }
        );
        assert_eq!(config.claude.model, ClaudeModel::Haiku45);
        assert_eq!(
            config.graphql.endpoint,
            dataconnect_url("demo", "us-central1", "matchday")
        );
        assert_eq!(config.graphql.auth, GraphqlAuth::Adc);
        assert_eq!(config.agent.max_iterations, 10);
        assert_eq!(config.agent.request_timeout, Duration::from_secs(120));
        assert_eq!(config.agent.generation.max_tokens, 1024);
        assert!(config.agent.generation.temperature.is_none());
        assert_eq!(config.agent.system_prompt, SYSTEM_PROMPT);
    }

    #[test]
    fn test_anthropic_with_explicit_endpoint() {
        let config = config(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("GRAPHQL_ENDPOINT", "http://localhost:9399/graphql"),
            ("CLAUDE_MODEL", "sonnet-4-5"),
            ("PORT", "8080"),
            ("AGENT_MAX_ITERATIONS", "4"),
            ("SYSTEM_PROMPT", "Be brief."),
            ("CLAUDE_TEMPERATURE", "0.2"),
        ])
        .unwrap();

        assert_eq!(
            config.claude.endpoint,
            ClaudeEndpoint::Anthropic {
                api_key: "sk-test".to_string()
            }
        );
        assert_eq!(config.claude.model, ClaudeModel::Sonnet45);
        assert_eq!(config.graphql.auth, GraphqlAuth::None);
        assert_eq!(config.port, 8080);
        assert_eq!(config.agent.max_iterations, 4);
        assert_eq!(config.agent.system_prompt, "Be brief.");
        assert_eq!(config.agent.generation.temperature, Some(0.2));
    }

    #[test]
    fn test_missing_model_credentials() {
        let err = config(&[("GRAPHQL_ENDPOINT", "http://localhost/graphql")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingEnvVar("ANTHROPIC_API_KEY or GCP_PROJECT_ID".to_string())
        );
    }

    #[test]
    fn test_missing_graphql_endpoint() {
        let err = config(&[("ANTHROPIC_API_KEY", "sk-test")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = config(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("GRAPHQL_ENDPOINT", "http://localhost/graphql"),
            ("PORT", "  "),
        ])
        .unwrap();
        assert_eq!(config.port, 3030);
    }

    #[test]
    fn test_invalid_values() {
        let base = [
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("GRAPHQL_ENDPOINT", "http://localhost/graphql"),
        ];

        let mut vars = base.to_vec();
        vars.push(("PORT", "eighty"));
        assert!(matches!(
            config(&vars),
            Err(ConfigError::InvalidValue(key, _)) if key == "PORT"
        ));

        let mut vars = base.to_vec();
        vars.push(("GRAPHQL_AUTH", "basic"));
        assert!(matches!(
            config(&vars),
            Err(ConfigError::InvalidValue(key, _)) if key == "GRAPHQL_AUTH"
        ));

        let mut vars = base.to_vec();
        vars.push(("AGENT_MAX_ITERATIONS", "0"));
        assert!(config(&vars).is_err());

        let mut vars = base.to_vec();
        vars.push(("CLAUDE_TEMPERATURE", "1.5"));
        assert!(matches!(
            config(&vars),
            Err(ConfigError::InvalidValue(key, _)) if key == "CLAUDE_TEMPERATURE"
        ));

        let mut vars = base.to_vec();
        vars.push(("CLAUDE_MODEL", "gpt-4"));
        assert!(matches!(
            config(&vars),
            Err(ConfigError::InvalidValue(key, _)) if key == "CLAUDE_MODEL"
        ));
    }
}
