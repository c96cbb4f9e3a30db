//! Client configuration.
//!
//! A [`ClientConfig`] names the project, the OAuth token and the cloud region
//! used to reach the service. It can be assembled in code or loaded from
//! layered sources with [`ClientConfig::load`]:
//!
//! 1. `./ironmq.{toml,yaml,json}` (optional)
//! 2. the file named by `IRONMQ_CONFIG_FILE` (required when the variable is set)
//! 3. `IRONMQ_*` environment variables, e.g. `IRONMQ_PROJECT_ID`, `IRONMQ_TOKEN`,
//!    `IRONMQ_CLOUD`, `IRONMQ_BASE_URL`, `IRONMQ_TIMEOUT_SECS`
//!
//! Later sources override earlier ones.

use crate::cloud::Cloud;
use crate::error::ConfigurationError;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_FILE_ENV: &str = "IRONMQ_CONFIG_FILE";

/// Prefix for configuration environment variables.
pub const ENV_PREFIX: &str = "IRONMQ";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the queue client.
///
/// # Examples
///
/// ```
/// use ironmq_client::{ClientConfig, Cloud};
/// use std::time::Duration;
///
/// let config = ClientConfig::new("my-project", "my-token")
///     .with_cloud(Cloud::Rackspace)
///     .with_timeout(Duration::from_secs(10));
///
/// assert_eq!(
///     config.endpoint(),
///     "https://mq-rackspace-dfw.iron.io/1/projects/my-project/"
/// );
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// Project identifier the queues belong to
    pub project_id: String,
    /// OAuth token sent with every request
    pub token: String,
    /// Cloud region hosting the project
    pub cloud: Cloud,
    /// Explicit base endpoint; overrides the cloud-derived one when set
    pub base_url: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// User agent string for API requests
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            token: String::new(),
            cloud: Cloud::default(),
            base_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("ironmq-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Create configuration for a project and token with default settings.
    pub fn new(project_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            token: token.into(),
            ..Self::default()
        }
    }

    /// Create a new builder for client configuration.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Set the cloud region.
    pub fn with_cloud(mut self, cloud: Cloud) -> Self {
        self.cloud = cloud;
        self
    }

    /// Set an explicit base endpoint (used for private deployments and tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Resolved base endpoint, always ending in `/` so relative paths join under it.
    pub fn endpoint(&self) -> String {
        match &self.base_url {
            Some(url) if url.ends_with('/') => url.clone(),
            Some(url) => format!("{}/", url),
            None => self.cloud.base_url(&self.project_id),
        }
    }

    /// Check that the configuration can reach a project.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.project_id.trim().is_empty() {
            return Err(ConfigurationError::Missing {
                key: "project_id".to_string(),
            });
        }

        if self.token.trim().is_empty() {
            return Err(ConfigurationError::Missing {
                key: "token".to_string(),
            });
        }

        if self.timeout.is_zero() {
            return Err(ConfigurationError::Invalid {
                message: "timeout must be greater than zero".to_string(),
            });
        }

        if let Some(base_url) = &self.base_url {
            url::Url::parse(base_url).map_err(|e| ConfigurationError::Invalid {
                message: format!("base_url '{}' is not a valid URL: {}", base_url, e),
            })?;
        }

        Ok(())
    }

    /// Load configuration from the default file, `IRONMQ_CONFIG_FILE` and
    /// `IRONMQ_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if a source is malformed, the explicit
    /// file is missing, or the merged result fails [`validate`](Self::validate).
    pub fn load() -> Result<Self, ConfigurationError> {
        let explicit_file = std::env::var(CONFIG_FILE_ENV)
            .ok()
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        Self::load_from_sources(
            explicit_file,
            ::config::Environment::with_prefix(ENV_PREFIX),
        )
    }

    pub(crate) fn load_from_sources(
        explicit_file: Option<PathBuf>,
        environment: ::config::Environment,
    ) -> Result<Self, ConfigurationError> {
        let mut builder = ::config::Config::builder()
            .add_source(::config::File::with_name("ironmq").required(false));

        if let Some(path) = explicit_file {
            tracing::debug!(path = %path.display(), "Loading client configuration from explicit path");
            builder = builder.add_source(::config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(environment)
            .build()
            .map_err(|e| ConfigurationError::Parsing {
                message: e.to_string(),
            })?;

        let raw: RawClientConfig =
            settings
                .try_deserialize()
                .map_err(|e| ConfigurationError::Parsing {
                    message: e.to_string(),
                })?;

        let config = raw.into_config();
        config.validate()?;
        Ok(config)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("project_id", &self.project_id)
            .field("token", &"<redacted>")
            .field("cloud", &self.cloud)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Flat shape read from configuration sources.
#[derive(Deserialize)]
struct RawClientConfig {
    #[serde(default)]
    project_id: String,
    #[serde(default)]
    token: String,
    #[serde(default)]
    cloud: Cloud,
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
    #[serde(default)]
    user_agent: Option<String>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl RawClientConfig {
    fn into_config(self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            project_id: self.project_id,
            token: self.token,
            cloud: self.cloud,
            base_url: self.base_url.filter(|url| !url.is_empty()),
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
        }
    }
}

/// Builder for constructing `ClientConfig` instances.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new configuration builder with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the project identifier.
    pub fn project_id(mut self, project_id: impl Into<String>) -> Self {
        self.config.project_id = project_id.into();
        self
    }

    /// Set the OAuth token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = token.into();
        self
    }

    /// Set the cloud region.
    pub fn cloud(mut self, cloud: Cloud) -> Self {
        self.config.cloud = cloud;
        self
    }

    /// Set an explicit base endpoint.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Build and validate the final configuration.
    pub fn build(self) -> Result<ClientConfig, ConfigurationError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
