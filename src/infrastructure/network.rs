use std::time::Duration;

use reqwest::{Client, ClientBuilder};

use crate::infrastructure::error::ReviewError;

/// 网络客户端配置
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    pub max_redirects: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("codelens/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 10,
        }
    }
}

/// 构建整个进程共享的 HTTP 客户端。
///
/// 失败不重试：任何请求级错误直接折叠为 ReviewError 上抛，
/// 重发由调用方用全新的请求显式发起。
pub fn build_client(config: &NetworkConfig) -> Result<Client, ReviewError> {
    ClientBuilder::new()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(config.user_agent.clone())
        .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
        .build()
        .map_err(|e| {
            ReviewError::network(format!("Failed to create HTTP client: {}", e), None)
        })
}
