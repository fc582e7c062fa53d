pub mod providers;

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use crate::models::ModelConfig;
use providers::{ProviderRegistry, PROVIDER_REGISTRY};

pub const GITHUB_API_URL: &str = "https://api.github.com";
pub const BITBUCKET_API_URL: &str = "https://api.bitbucket.org";

#[derive(Debug, Clone)]
pub struct Config {
    /// 当前选定的模型提供商（注册表键）
    pub provider: String,
    /// 审查模型，空串表示使用注册表默认值
    pub model: String,
    /// 聊天跟进模型，空串表示使用注册表默认值
    pub chat_model: String,
    /// 进程级唯一凭证，启动时读取一次
    pub api_key: Option<String>,
    /// 各提供商端点覆盖，键为注册表键
    pub endpoint_overrides: HashMap<String, String>,
    pub github_api_url: String,
    pub bitbucket_api_url: String,
    pub debug: bool,
}

impl Config {
    pub fn new() -> Self {
        // 默认配置
        let mut config = Config {
            provider: "gemini".to_string(),
            model: String::new(),
            chat_model: String::new(),
            api_key: None,
            endpoint_overrides: HashMap::new(),
            github_api_url: GITHUB_API_URL.to_string(),
            bitbucket_api_url: BITBUCKET_API_URL.to_string(),
            debug: false,
        };

        // 加载配置文件
        #[cfg(not(test))]
        config.load_from_env_file();
        // 加载环境变量（覆盖配置文件）
        config.load_from_env();

        config
    }

    pub fn load_from_env_file(&mut self) {
        // 尝试从用户主目录加载
        if let Ok(home) = env::var("HOME") {
            let user_env_path = PathBuf::from(format!("{}/.codelens/.env", home));
            if user_env_path.exists() {
                dotenvy::from_path(user_env_path).ok();
            }
        }

        // 尝试从当前目录加载
        dotenvy::dotenv().ok();
    }

    pub fn load_from_env(&mut self) {
        if let Ok(provider) = env::var("CODELENS_PROVIDER") {
            self.provider = provider;
        }
        if let Ok(model) = env::var("CODELENS_MODEL") {
            self.model = model;
        }
        if let Ok(chat_model) = env::var("CODELENS_CHAT_MODEL") {
            self.chat_model = chat_model;
        }
        if let Ok(api_key) = env::var("CODELENS_API_KEY") {
            self.api_key = Some(api_key);
        }
        if let Ok(url) = env::var("CODELENS_GITHUB_API_URL") {
            self.github_api_url = url;
        }
        if let Ok(url) = env::var("CODELENS_BITBUCKET_API_URL") {
            self.bitbucket_api_url = url;
        }
        if let Ok(debug) = env::var("CODELENS_DEBUG") {
            self.debug = debug == "1" || debug.eq_ignore_ascii_case("true");
        }

        // 逐提供商的端点覆盖（如 CODELENS_QWEN_URL）
        for (name, info) in PROVIDER_REGISTRY.iter() {
            if let Ok(url) = env::var(info.url_env_var()) {
                self.endpoint_overrides.insert(name.clone(), url);
            }
        }
    }

    pub fn update_from_args(&mut self, args: &crate::cli::args::Args) {
        // 命令行参数优先级最高
        if !args.provider.is_empty() {
            self.provider = args.provider.clone();
        }
        if !args.model.is_empty() {
            self.model = args.model.clone();
        }
        if args.debug {
            self.debug = true;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let info = match ProviderRegistry::get_provider(&self.provider) {
            Some(info) => info,
            None => anyhow::bail!(
                "Unsupported provider: {}. Supported providers: gemini, openrouter, qwen, glm",
                self.provider
            ),
        };

        info.validate(self.api_key.as_deref())?;

        if let Some(url) = self.endpoint_overrides.get(&self.provider) {
            url::Url::parse(url)
                .map_err(|e| anyhow::anyhow!("Invalid endpoint override '{}': {}", url, e))?;
        }

        Ok(())
    }

    /// 当前提供商的审查模型配置
    pub fn model_config(&self) -> ModelConfig {
        let model = if self.model.is_empty() {
            ProviderRegistry::get_provider(&self.provider)
                .map(|info| info.default_model.clone())
                .unwrap_or_default()
        } else {
            self.model.clone()
        };

        ModelConfig {
            provider: self.provider.clone(),
            model,
            base_url: self.endpoint_overrides.get(&self.provider).cloned(),
        }
    }

    /// 当前提供商的聊天模型配置
    pub fn chat_model_config(&self) -> ModelConfig {
        let model = if self.chat_model.is_empty() {
            ProviderRegistry::get_provider(&self.provider)
                .map(|info| info.default_chat_model.clone())
                .unwrap_or_default()
        } else {
            self.chat_model.clone()
        };

        ModelConfig {
            provider: self.provider.clone(),
            model,
            base_url: self.endpoint_overrides.get(&self.provider).cloned(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clear_env() {
        env::remove_var("CODELENS_PROVIDER");
        env::remove_var("CODELENS_MODEL");
        env::remove_var("CODELENS_CHAT_MODEL");
        env::remove_var("CODELENS_API_KEY");
        env::remove_var("CODELENS_GITHUB_API_URL");
        env::remove_var("CODELENS_BITBUCKET_API_URL");
        env::remove_var("CODELENS_DEBUG");
        for info in PROVIDER_REGISTRY.values() {
            env::remove_var(info.url_env_var());
        }
    }

    #[test]
    fn test_config_defaults() {
        clear_env();
        let config = Config::new();
        assert_eq!(config.provider, "gemini");
        assert!(config.model.is_empty());
        assert!(config.api_key.is_none());
        assert_eq!(config.github_api_url, GITHUB_API_URL);
        assert_eq!(config.bitbucket_api_url, BITBUCKET_API_URL);
        clear_env();
    }

    #[test]
    fn test_model_config_falls_back_to_registry_default() {
        clear_env();
        let config = Config::new();
        let model_config = config.model_config();
        assert_eq!(model_config.provider, "gemini");
        assert_eq!(model_config.model, "gemini-3-pro-preview");
        assert!(model_config.base_url.is_none());

        let chat_config = config.chat_model_config();
        assert_eq!(chat_config.model, "gemini-3-flash-preview");
        clear_env();
    }

    #[test]
    fn test_config_validation() {
        clear_env();
        let mut config = Config::new();

        // gemini 缺少 API key
        config.api_key = None;
        assert!(config.validate().is_err());

        config.api_key = Some("test-key".to_string());
        assert!(config.validate().is_ok());

        // 不支持的 provider
        config.provider = "unsupported".to_string();
        assert!(config.validate().is_err());

        // 非法端点覆盖
        config.provider = "qwen".to_string();
        config
            .endpoint_overrides
            .insert("qwen".to_string(), "not a url".to_string());
        assert!(config.validate().is_err());
        clear_env();
    }
}
