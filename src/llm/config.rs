pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Clone)]
pub struct LLMConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl LLMConfig {
    pub fn new(api_url: String, api_key: Option<String>, model: String) -> Self {
        Self {
            api_url,
            api_key,
            model,
        }
    }

    /// Endpoint for a single `generateContent` call against the configured model.
    pub fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Value of the `key` query parameter. Empty when the deployment has not injected one.
    pub fn key_param(&self) -> &str {
        self.api_key.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_flash_model() {
        let config = LLMConfig::new(DEFAULT_API_URL.to_string(), None, DEFAULT_MODEL.to_string());
        assert_eq!(
            config.generate_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert_eq!(config.key_param(), "");
    }

    #[test]
    fn trailing_slash_in_base_url_is_ignored() {
        let config = LLMConfig::new(
            "http://localhost:8080/v1beta/".to_string(),
            Some("abc".to_string()),
            "gemini-pro".to_string(),
        );
        assert_eq!(
            config.generate_url(),
            "http://localhost:8080/v1beta/models/gemini-pro:generateContent"
        );
        assert_eq!(config.key_param(), "abc");
    }
}
