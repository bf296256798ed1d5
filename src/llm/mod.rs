pub mod config;
pub mod error;
pub mod gemini;
pub mod provider;

pub use config::LLMConfig;
pub use error::RequestError;
pub use gemini::GeminiClient;
pub use provider::Provider;
