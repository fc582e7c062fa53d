use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// 提供商配置信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// 提供商名称
    pub name: String,
    /// 显示名称
    pub display_name: String,
    /// 默认 API URL
    pub default_url: String,
    /// 是否需要 API Key
    pub requires_api_key: bool,
    /// 默认模型
    pub default_model: String,
    /// 聊天跟进使用的默认模型
    pub default_chat_model: String,
    /// API 格式类型
    pub api_format: ApiFormat,
    /// 是否支持 JSON 输出模式（response_format）
    pub supports_json_mode: bool,
    /// 环境变量前缀
    pub env_prefix: String,
}

/// API 格式类型
///
/// 该标签决定走哪一个适配器：Google 为原生结构化输出端点，
/// OpenAI 覆盖全部聊天补全族后端（OpenRouter、Qwen、GLM）。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApiFormat {
    /// Google Generative AI 格式 (Gemini)
    Google,
    /// OpenAI 兼容格式 (OpenRouter, Qwen, GLM)
    OpenAI,
}

/// 获取默认提供商配置
fn get_default_providers() -> HashMap<String, ProviderInfo> {
    let mut providers = HashMap::new();

    // Gemini 配置
    providers.insert(
        "gemini".to_string(),
        ProviderInfo {
            name: "gemini".to_string(),
            display_name: "Gemini".to_string(),
            default_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            requires_api_key: true,
            default_model: "gemini-3-pro-preview".to_string(),
            default_chat_model: "gemini-3-flash-preview".to_string(),
            api_format: ApiFormat::Google,
            supports_json_mode: true,
            env_prefix: "CODELENS_GEMINI".to_string(),
        },
    );

    // OpenRouter 配置
    providers.insert(
        "openrouter".to_string(),
        ProviderInfo {
            name: "openrouter".to_string(),
            display_name: "OpenRouter".to_string(),
            default_url: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            requires_api_key: true,
            default_model: "anthropic/claude-3.5-sonnet".to_string(),
            default_chat_model: "anthropic/claude-3.5-sonnet".to_string(),
            api_format: ApiFormat::OpenAI,
            supports_json_mode: true,
            env_prefix: "CODELENS_OPENROUTER".to_string(),
        },
    );

    // Qwen 配置
    providers.insert(
        "qwen".to_string(),
        ProviderInfo {
            name: "qwen".to_string(),
            display_name: "Qwen".to_string(),
            default_url: "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions"
                .to_string(),
            requires_api_key: true,
            default_model: "qwen-max".to_string(),
            default_chat_model: "qwen-turbo".to_string(),
            api_format: ApiFormat::OpenAI,
            supports_json_mode: true,
            env_prefix: "CODELENS_QWEN".to_string(),
        },
    );

    // GLM 配置
    providers.insert(
        "glm".to_string(),
        ProviderInfo {
            name: "glm".to_string(),
            display_name: "GLM".to_string(),
            default_url: "https://open.bigmodel.cn/api/paas/v4/chat/completions".to_string(),
            requires_api_key: true,
            default_model: "glm-4".to_string(),
            default_chat_model: "glm-4-flash".to_string(),
            api_format: ApiFormat::OpenAI,
            supports_json_mode: true,
            env_prefix: "CODELENS_GLM".to_string(),
        },
    );

    providers
}

/// 全局提供商配置映射
pub static PROVIDER_REGISTRY: Lazy<HashMap<String, ProviderInfo>> =
    Lazy::new(get_default_providers);

impl ProviderInfo {
    /// 获取 API URL 环境变量名
    pub fn url_env_var(&self) -> String {
        format!("{}_URL", self.env_prefix)
    }

    /// 验证提供商是否配置正确
    pub fn validate(&self, api_key: Option<&str>) -> anyhow::Result<()> {
        if self.requires_api_key && api_key.is_none() {
            anyhow::bail!(
                "{} API key is required but not set. Please set CODELENS_API_KEY environment variable or in .env file",
                self.display_name
            );
        }
        Ok(())
    }
}

/// 提供商注册表操作
pub struct ProviderRegistry;

impl ProviderRegistry {
    /// 获取所有已注册的提供商
    pub fn list_providers() -> Vec<&'static str> {
        PROVIDER_REGISTRY.keys().map(|s| s.as_str()).collect()
    }

    /// 获取提供商信息
    pub fn get_provider(name: &str) -> Option<&'static ProviderInfo> {
        PROVIDER_REGISTRY.get(name)
    }

    /// 检查提供商是否存在
    pub fn exists(name: &str) -> bool {
        PROVIDER_REGISTRY.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_registry_basic() {
        let providers = ProviderRegistry::list_providers();
        assert!(providers.contains(&"gemini"));
        assert!(providers.contains(&"openrouter"));
        assert!(providers.contains(&"qwen"));
        assert!(providers.contains(&"glm"));
    }

    #[test]
    fn test_api_formats() {
        let gemini = ProviderRegistry::get_provider("gemini").unwrap();
        assert_eq!(gemini.api_format, ApiFormat::Google);

        let openrouter = ProviderRegistry::get_provider("openrouter").unwrap();
        assert_eq!(openrouter.api_format, ApiFormat::OpenAI);

        let qwen = ProviderRegistry::get_provider("qwen").unwrap();
        assert_eq!(qwen.api_format, ApiFormat::OpenAI);

        let glm = ProviderRegistry::get_provider("glm").unwrap();
        assert_eq!(glm.api_format, ApiFormat::OpenAI);
    }

    #[test]
    fn test_provider_info_validation() {
        let gemini = ProviderRegistry::get_provider("gemini").unwrap();
        assert!(gemini.validate(None).is_err());
        assert!(gemini.validate(Some("test-key")).is_ok());
    }

    #[test]
    fn test_provider_env_vars() {
        let qwen = ProviderRegistry::get_provider("qwen").unwrap();
        assert_eq!(qwen.url_env_var(), "CODELENS_QWEN_URL");
    }

    #[test]
    fn test_unknown_provider() {
        assert!(!ProviderRegistry::exists("ollama"));
        assert!(ProviderRegistry::get_provider("ollama").is_none());
    }
}
