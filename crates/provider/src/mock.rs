//! Mock 生成客户端
//!
//! 用于单元测试与离线运行的 mock 实现，支持注入延迟、拦截与失败场景。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use contracts::{
    ContractError, GenerationClient, GenerationConfig, GenerationRequest, GenerationResponse,
    ModelHandle, PromptFeedback, SafetySettings,
};
use tracing::debug;

/// Mock 客户端配置
#[derive(Debug, Clone, Default)]
pub struct MockBehavior {
    /// 固定响应文本
    pub response_text: String,
    /// 每次调用前的人工延迟
    pub delay: Option<Duration>,
    /// 注入的拦截原因（模拟内容过滤）
    pub block_reason: Option<String>,
    /// 注入的失败消息
    pub fail_with: Option<String>,
}

/// Mock 生成客户端
///
/// 默认返回一个固定 JSON 判定结果，便于 CLI 离线演示。
pub struct MockClient {
    behavior: MockBehavior,
    calls: AtomicU64,
    /// 最后一次收到的 prompt（便于断言）
    last_prompt: Mutex<Option<String>>,
}

impl MockClient {
    /// 创建默认 mock 客户端
    pub fn new() -> Self {
        Self::with_behavior(MockBehavior {
            response_text: default_verdict_json(),
            ..Default::default()
        })
    }

    /// 使用配置创建 mock 客户端
    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicU64::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// 设置固定响应文本
    pub fn with_response(mut self, text: impl Into<String>) -> Self {
        self.behavior.response_text = text.into();
        self
    }

    /// 设置人工延迟
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.behavior.delay = Some(delay);
        self
    }

    /// 注入拦截原因
    pub fn with_block_reason(mut self, reason: impl Into<String>) -> Self {
        self.behavior.block_reason = Some(reason.into());
        self
    }

    /// 注入失败消息
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.behavior.fail_with = Some(message.into());
        self
    }

    /// 已处理的调用次数
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// 最后一次收到的 prompt
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().ok().and_then(|g| g.clone())
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationClient for MockClient {
    fn create_model(
        &self,
        name: &str,
        safety: Option<SafetySettings>,
        generation: Option<GenerationConfig>,
    ) -> Result<ModelHandle, ContractError> {
        if name.trim().is_empty() {
            return Err(ContractError::model_creation(name, "model name is empty"));
        }
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
        self.calls.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut guard) = self.last_prompt.lock() {
            *guard = Some(request.prompt.clone());
        }
        debug!(model = request.model.name(), "Mock generate");

        if let Some(delay) = self.behavior.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(ref message) = self.behavior.fail_with {
            return Err(ContractError::Other(message.clone()));
        }

        if let Some(ref reason) = self.behavior.block_reason {
            return Ok(GenerationResponse {
                candidates: Vec::new(),
                prompt_feedback: Some(PromptFeedback {
                    block_reason: Some(reason.clone()),
                    safety_ratings: Vec::new(),
                }),
            });
        }

        Ok(GenerationResponse::from_text(&self.behavior.response_text))
    }
}

/// Canned verdict returned by the default mock, shaped like the analysis
/// JSON the real model is prompted for
fn default_verdict_json() -> String {
    serde_json::json!({
        "risk_level": "Low",
        "summary": "Mock analysis: no real model was consulted.",
        "alerts": [],
        "recommendation": "Run with a configured API key for a real verdict."
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_configured_text() {
        let client = MockClient::new().with_response("hello");
        let model = client.create_model("test-model", None, None).unwrap();
        let request = GenerationRequest {
            model,
            prompt: "hi".to_string(),
            generation: GenerationConfig::default(),
            safety: SafetySettings::default(),
        };

        let response = client.generate(&request).await.unwrap();
        assert_eq!(response.text(), "hello");
        assert_eq!(client.call_count(), 1);
        assert_eq!(client.last_prompt().as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn test_mock_injected_block_reason() {
        let client = MockClient::new().with_block_reason("SAFETY");
        let model = client.create_model("test-model", None, None).unwrap();
        let request = GenerationRequest {
            model,
            prompt: "blocked".to_string(),
            generation: GenerationConfig::default(),
            safety: SafetySettings::default(),
        };

        let response = client.generate(&request).await.unwrap();
        assert_eq!(response.block_reason(), Some("SAFETY"));
    }

    #[test]
    fn test_mock_rejects_empty_model_name() {
        let client = MockClient::new();
        assert!(client.create_model("  ", None, None).is_err());
    }

    #[test]
    fn test_default_verdict_parses_as_json() {
        let value: serde_json::Value = serde_json::from_str(&default_verdict_json()).unwrap();
        assert_eq!(value["risk_level"], "Low");
    }
}
