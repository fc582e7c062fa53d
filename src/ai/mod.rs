pub mod prompt;
pub mod providers;
pub mod result_processor;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::providers::{ApiFormat, ProviderRegistry};
use crate::config::Config;
use crate::infrastructure::error::ReviewError;
use crate::models::{FileBatch, ModelConfig, ReviewResult};

pub use providers::gemini::GeminiProvider;
pub use providers::openai_compat::OpenAiCompatProvider;

/// 一次审查调用的规范请求。
///
/// 构造时即派生提示体（BuildingRequest 阶段），之后不可变；
/// 重试必须构造全新的请求。
#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub batch: FileBatch,
    pub model: ModelConfig,
    pub prompt: String,
    pub correlation_id: String,
}

impl ReviewRequest {
    pub fn new(batch: FileBatch, model: ModelConfig) -> Self {
        let prompt = prompt::build_review_prompt(&batch);
        Self {
            batch,
            model,
            prompt,
            correlation_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// 一次聊天跟进的规范请求：只携带最新一条用户消息与在审文件名
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub message: String,
    pub file_names: Vec<String>,
    pub model: ModelConfig,
}

/// AI 提供商适配器接口。
///
/// 每个后端一个实现，负责规范请求与自身线格式之间的双向转换；
/// 编排器除选择适配器外从不按提供商分支。
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// 获取提供商名称
    fn name(&self) -> &str;

    /// 执行一次审查调用，返回规范结果
    async fn review(&self, request: &ReviewRequest) -> Result<ReviewResult, ReviewError>;

    /// 执行一次单轮聊天调用，原样返回回复文本
    async fn chat(&self, request: &ChatRequest) -> Result<String, ReviewError>;
}

/// 按注册表的 API 格式标签构造适配器。
///
/// 凭证与提供商合法性在此检查，任何网络调用之前即失败。
pub fn build_adapter(
    client: Arc<reqwest::Client>,
    config: &Config,
    model: &ModelConfig,
) -> Result<Box<dyn AiProvider>, ReviewError> {
    let info = ProviderRegistry::get_provider(&model.provider).ok_or_else(|| {
        ReviewError::config(format!("Unsupported provider: {}", model.provider))
    })?;

    let api_key = match &config.api_key {
        Some(key) if !key.is_empty() => key.clone(),
        _ if info.requires_api_key => {
            return Err(ReviewError::config(format!(
                "{} API key is required but not set. Please set CODELENS_API_KEY environment variable or in .env file",
                info.display_name
            )))
        }
        _ => String::new(),
    };

    let base_url = model
        .base_url
        .clone()
        .unwrap_or_else(|| info.default_url.clone());

    let adapter: Box<dyn AiProvider> = match info.api_format {
        ApiFormat::Google => Box::new(GeminiProvider::new(client, api_key, base_url)),
        ApiFormat::OpenAI => Box::new(OpenAiCompatProvider::new(
            client,
            info.name.clone(),
            api_key,
            base_url,
            info.supports_json_mode,
        )),
    };

    Ok(adapter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceFile;

    fn test_config() -> Config {
        let mut config = Config::new();
        config.api_key = Some("test-key".to_string());
        config
    }

    #[test]
    fn test_review_request_builds_prompt_once() {
        let batch: FileBatch = vec![SourceFile::new("a.java", "class A {}")].into();
        let request = ReviewRequest::new(batch, test_config().model_config());
        assert!(request.prompt.contains("--- FILE: a.java ---"));
        assert!(!request.correlation_id.is_empty());
    }

    #[test]
    fn test_build_adapter_selects_by_api_format() {
        let client = Arc::new(reqwest::Client::new());
        let config = test_config();

        let gemini = ModelConfig {
            provider: "gemini".to_string(),
            model: "gemini-3-pro-preview".to_string(),
            base_url: None,
        };
        let adapter = build_adapter(client.clone(), &config, &gemini).unwrap();
        assert_eq!(adapter.name(), "gemini");

        let qwen = ModelConfig {
            provider: "qwen".to_string(),
            model: "qwen-max".to_string(),
            base_url: None,
        };
        let adapter = build_adapter(client, &config, &qwen).unwrap();
        assert_eq!(adapter.name(), "qwen");
    }

    #[test]
    fn test_build_adapter_rejects_unknown_provider() {
        let client = Arc::new(reqwest::Client::new());
        let config = test_config();
        let unknown = ModelConfig {
            provider: "ollama".to_string(),
            model: "mistral".to_string(),
            base_url: None,
        };
        let err = build_adapter(client, &config, &unknown).err().unwrap();
        assert!(matches!(err, ReviewError::Configuration { .. }));
    }

    #[test]
    fn test_build_adapter_requires_credential() {
        let client = Arc::new(reqwest::Client::new());
        let mut config = test_config();
        config.api_key = None;

        let err = build_adapter(client, &config, &config.model_config()).err().unwrap();
        assert!(matches!(err, ReviewError::Configuration { .. }));
    }
}
