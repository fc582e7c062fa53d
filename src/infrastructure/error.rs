use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 审查错误类型
///
/// 核心内的所有失败都折叠进该枚举并原样上抛，调用方只见到统一形状。
/// 任何变体都不会被自动重试。
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ReviewError {
    /// 配置错误：缺少凭证、未知提供商、坐标或端点不合法。
    /// 在任何网络调用之前检出。
    #[error("配置错误: {message}")]
    Configuration { message: String },

    /// 没有可供审查的文件或内容，本地快速失败
    #[error("没有可供审查的文件内容")]
    EmptyInput,

    /// 托管 API 或模型 API 返回非成功状态码
    #[error("请求失败: 状态码 {status}, {message}")]
    Transport { status: u16, message: String },

    /// HTTP 之下的请求级失败（连接、超时、读体）
    #[error("网络错误: {message}")]
    Network { message: String, url: Option<String> },

    /// 提供商返回内容无法通过 JSON 解析或必填字段校验。
    /// 展示信息保持通用，原始载荷只进调试日志。
    #[error("AI 响应解析失败，请检查工程复杂度并重试")]
    ResponseMalformed { detail: String },
}

impl ReviewError {
    /// 创建配置错误
    pub fn config(message: impl Into<String>) -> Self {
        ReviewError::Configuration {
            message: message.into(),
        }
    }

    /// 创建传输错误
    pub fn transport(status: u16, message: impl Into<String>) -> Self {
        ReviewError::Transport {
            status,
            message: message.into(),
        }
    }

    /// 创建网络错误
    pub fn network(message: impl Into<String>, url: Option<String>) -> Self {
        ReviewError::Network {
            message: message.into(),
            url,
        }
    }

    /// 创建响应解析错误
    pub fn malformed(detail: impl Into<String>) -> Self {
        ReviewError::ResponseMalformed {
            detail: detail.into(),
        }
    }

    /// 聊天兜底只对传输层失败生效，配置/输入错误仍然上抛
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            ReviewError::Transport { .. } | ReviewError::Network { .. }
        )
    }
}

impl From<reqwest::Error> for ReviewError {
    fn from(error: reqwest::Error) -> Self {
        ReviewError::Network {
            message: error.to_string(),
            url: error.url().map(|u| u.to_string()),
        }
    }
}

impl From<serde_json::Error> for ReviewError {
    fn from(error: serde_json::Error) -> Self {
        ReviewError::ResponseMalformed {
            detail: error.to_string(),
        }
    }
}
