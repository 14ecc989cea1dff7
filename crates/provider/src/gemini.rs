//! Gemini REST 客户端
//!
//! 通过 generativelanguage REST API 调用模型。API key 只通过
//! 环境变量注入，绝不写入配置文件或日志。

use contracts::{
    ContractError, GeminiSettings, GenerationClient, GenerationConfig, GenerationRequest,
    GenerationResponse, ModelHandle, SafetySettings,
};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Prompt used to probe the API at startup
const CONNECTION_TEST_PROMPT: &str = "Test connection. Respond with 'OK'.";

/// Real Gemini client
///
/// The provider's global configuration (API key) is an explicit
/// construction step; anything built on top may assume it has happened.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a client from an explicit API key
    ///
    /// Fails fast with `ApiKeyMissing` when the key is empty, so a
    /// misconfigured deployment dies at startup, not on first request.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ContractError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ContractError::ApiKeyMissing {
                env_var: "GOOGLE_API_KEY".to_string(),
            });
        }
        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Create a client by reading the configured environment variable
    pub fn from_env(settings: &GeminiSettings) -> Result<Self, ContractError> {
        match std::env::var(&settings.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Self::new(key),
            _ => Err(ContractError::ApiKeyMissing {
                env_var: settings.api_key_env.clone(),
            }),
        }
    }

    /// Override the API base URL (used by tests against a local server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Probe the API with a one-token request
    ///
    /// Issued once at startup; an empty answer counts as failure.
    #[instrument(name = "gemini_check_connection", skip(self))]
    pub async fn check_connection(&self, model_name: &str) -> Result<(), ContractError> {
        let model = self.create_model(model_name, None, None)?;
        let request = GenerationRequest {
            model,
            prompt: CONNECTION_TEST_PROMPT.to_string(),
            generation: GenerationConfig::default(),
            safety: SafetySettings::default(),
        };

        let response = self.generate(&request).await?;
        if response.text().is_empty() {
            return Err(ContractError::EmptyResponse);
        }

        info!(model = model_name, "Gemini connection test successful");
        Ok(())
    }
}

impl GenerationClient for GeminiClient {
    fn create_model(
        &self,
        name: &str,
        safety: Option<SafetySettings>,
        generation: Option<GenerationConfig>,
    ) -> Result<ModelHandle, ContractError> {
        validate_model_name(name)?;
        debug!(model = name, "Created Gemini model handle");
        Ok(ModelHandle::new(
            name,
            safety.unwrap_or_default(),
            generation.unwrap_or_default(),
        ))
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, ContractError> {
        // Key travels in the query string; never log the URL
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url,
            request.model.name(),
            self.api_key
        );
        let body = GenerateContentBody::from_request(request);

        debug!(model = request.model.name(), "Sending generateContent request");

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ContractError::http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                model = request.model.name(),
                "Gemini API returned error status"
            );
            return Err(ContractError::api(status.as_u16(), message));
        }

        response
            .json::<GenerationResponse>()
            .await
            .map_err(|e| ContractError::decode(e.to_string()))
    }
}

/// Reject names the REST path cannot carry
fn validate_model_name(name: &str) -> Result<(), ContractError> {
    if name.trim().is_empty() {
        return Err(ContractError::model_creation(name, "model name is empty"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'))
    {
        return Err(ContractError::model_creation(
            name,
            "model name contains invalid characters",
        ));
    }
    Ok(())
}

/// Request body for models/{name}:generateContent
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    contents: Vec<WireContent<'a>>,
    generation_config: &'a GenerationConfig,
    safety_settings: Vec<WireSafetySetting>,
}

impl<'a> GenerateContentBody<'a> {
    fn from_request(request: &'a GenerationRequest) -> Self {
        Self {
            contents: vec![WireContent {
                parts: vec![WirePart {
                    text: &request.prompt,
                }],
            }],
            generation_config: &request.generation,
            safety_settings: request
                .safety
                .iter()
                .map(|(category, threshold)| WireSafetySetting {
                    category: category.api_name(),
                    threshold: threshold.api_name(),
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct WireContent<'a> {
    parts: Vec<WirePart<'a>>,
}

#[derive(Serialize)]
struct WirePart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireSafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_api_key_fails_fast() {
        let result = GeminiClient::new("   ");
        assert!(matches!(result, Err(ContractError::ApiKeyMissing { .. })));
    }

    #[test]
    fn test_create_model_validates_name() {
        let client = GeminiClient::new("test-key").unwrap();
        assert!(client.create_model("gemini-1.5-flash", None, None).is_ok());
        assert!(client.create_model("", None, None).is_err());
        assert!(client
            .create_model("models/../etc/passwd", None, None)
            .is_err());
    }

    #[test]
    fn test_handle_defaults_applied() {
        let client = GeminiClient::new("test-key").unwrap();
        let handle = client.create_model("gemini-1.5-flash", None, None).unwrap();
        assert_eq!(handle.generation().temperature, 0.7);
        assert_eq!(handle.generation().max_output_tokens, 2048);
    }

    #[test]
    fn test_body_uses_wire_names() {
        let client = GeminiClient::new("test-key").unwrap();
        let model = client.create_model("gemini-1.5-flash", None, None).unwrap();
        let request = GenerationRequest {
            model,
            prompt: "hello".to_string(),
            generation: GenerationConfig::default(),
            safety: SafetySettings::default(),
        };

        let body = GenerateContentBody::from_request(&request);
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(value["generationConfig"]["temperature"], 0.7);
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 2048);

        let categories: Vec<_> = value["safetySettings"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["category"].as_str().unwrap().to_string())
            .collect();
        assert!(categories.contains(&"HARM_CATEGORY_HARASSMENT".to_string()));
        assert!(value["safetySettings"][0]["threshold"] == "BLOCK_NONE");
    }
}
