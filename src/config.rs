//! Configuration Management Module
//!
//! TOML-file configuration with environment-variable overrides for the
//! secrets. Precedence: built-in defaults, then the config file, then the
//! environment. Sections for collaborators (GitHub, ServiceNow, LLM) are
//! optional; an absent section disables that collaborator.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use faultline_api::{ApiConfig, LlmConfig};
use faultline_github::GithubConfig;
use faultline_servicenow::ServiceNowConfig;

/// Environment variable overriding the GitHub token
const ENV_GITHUB_TOKEN: &str = "FAULTLINE_GITHUB_TOKEN";
/// Environment variable overriding the ServiceNow password
const ENV_SNOW_PASSWORD: &str = "FAULTLINE_SNOW_PASSWORD";
/// Environment variable overriding the LLM API key
const ENV_LLM_API_KEY: &str = "FAULTLINE_LLM_API_KEY";

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server bind settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Repository to resolve faults against
    pub github: Option<GithubConfig>,
    /// Ticketing instance for incident creation
    pub servicenow: Option<ServiceNowConfig>,
    /// Provider for the optional enrichment pass
    pub llm: Option<LlmConfig>,
}

impl AppConfig {
    /// Load configuration from `path`, the default location, or defaults
    ///
    /// A missing default file is not an error; an explicitly passed path
    /// must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                parse(&content)?
            }
            None => match default_config_path() {
                Some(path) if path.exists() => {
                    debug!(path = %path.display(), "loading default config file");
                    let content = fs::read_to_string(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    parse(&content)?
                }
                _ => AppConfig::default(),
            },
        };

        config.apply_env_overrides();
        config.validate()?;
        info!(
            github = config.github.is_some(),
            servicenow = config.servicenow.is_some(),
            llm = config.llm.is_some(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Secrets from the environment win over file values
    fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var(ENV_GITHUB_TOKEN) {
            if let Some(github) = &mut self.github {
                github.token = Some(token);
            }
        }
        if let Ok(password) = std::env::var(ENV_SNOW_PASSWORD) {
            if let Some(servicenow) = &mut self.servicenow {
                servicenow.password = password;
            }
        }
        if let Ok(api_key) = std::env::var(ENV_LLM_API_KEY) {
            if let Some(llm) = &mut self.llm {
                llm.api_key = Some(api_key);
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if let Some(github) = &self.github {
            if github.owner.is_empty() || github.repo.is_empty() {
                return Err(anyhow!("github section requires both owner and repo"));
            }
        }
        if let Some(servicenow) = &self.servicenow {
            if servicenow.instance_url.is_empty() {
                return Err(anyhow!("servicenow section requires instance_url"));
            }
        }
        Ok(())
    }
}

fn parse(content: &str) -> Result<AppConfig> {
    toml::from_str(content).context("failed to parse configuration TOML")
}

/// `~/.config/faultline/config.toml` (platform equivalent)
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("faultline").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_have_no_collaborators() {
        let config = AppConfig::default();
        assert!(config.github.is_none());
        assert!(config.servicenow.is_none());
        assert!(config.llm.is_none());
        assert_eq!(config.api.port, 8080);
    }

    #[test]
    fn test_parse_full_config() {
        let config = parse(
            r#"
            [api]
            host = "127.0.0.1"
            port = 9090

            [github]
            owner = "acme"
            repo = "crm"
            branch = "release"

            [servicenow]
            instance_url = "https://dev1.service-now.com"
            username = "svc"
            password = "secret"

            [llm]
            base_url = "http://localhost:11434/v1"
            model = "llama3"
            max_tokens = 400
            "#,
        )
        .unwrap();

        assert_eq!(config.api.port, 9090);
        let github = config.github.unwrap();
        assert_eq!(github.owner, "acme");
        assert_eq!(github.branch, "release");
        assert_eq!(config.llm.unwrap().model, "llama3");
    }

    #[test]
    fn test_missing_owner_is_rejected() {
        let config = parse(
            r#"
            [github]
            owner = ""
            repo = "crm"
            branch = "main"
            "#,
        )
        .unwrap();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nhost = \"0.0.0.0\"\nport = 7000").unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.api.port, 7000);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        assert!(AppConfig::load(Some(Path::new("/nonexistent/faultline.toml"))).is_err());
    }
}
