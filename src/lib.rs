//! Faultline — error-to-diagnosis service
//!
//! Library surface of the binary crate: configuration loading and the
//! offline repository stub used when no GitHub repository is configured.

pub mod config;
pub mod offline;

pub use config::AppConfig;
pub use offline::OfflineRepository;
