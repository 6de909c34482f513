//! Faultline API Module
//!
//! The API module exposes the analysis pipeline over HTTP, optionally
//! enriching reports with an LLM pass and filing ServiceNow incidents.

pub mod handlers;
pub mod llm;
pub mod models;
pub mod server;

pub use handlers::ApiState;
pub use llm::{LlmAnalyzer, LlmConfig};
pub use models::{AnalyzeRequest, AnalyzeResponse, ApiConfig};
pub use server::ApiServer;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_config_creation() {
        let config = ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        };

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
    }
}
