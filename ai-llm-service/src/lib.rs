//! Ollama access for the knitting recommender.
//!
//! Two logical profiles are used by the rest of the workspace:
//! - **generation**: prose recommendations (`/api/generate`)
//! - **embedding**: pattern and query vectors (`/api/embed`, `/api/embeddings`)
//!
//! Configs are built once from the environment (see [`config::default_config`])
//! and handed to [`LlmServiceProfiles`], which owns one HTTP client per distinct
//! profile.

pub mod config;
pub mod error_handler;
pub mod service_profiles;
pub mod services;

pub use config::llm_model_config::LlmModelConfig;
pub use error_handler::{AiLlmError, ConfigError, Result};
pub use service_profiles::LlmServiceProfiles;
pub use services::ollama_service::{OllamaError, OllamaService};
