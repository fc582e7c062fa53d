use std::sync::Arc;

use reqwest::Client;

use crate::ai::{build_adapter, prompt, ChatRequest, ReviewRequest};
use crate::config::Config;
use crate::infrastructure::error::ReviewError;
use crate::infrastructure::network::{build_client, NetworkConfig};
use crate::models::{ChatHistory, FileBatch, ReviewResult};

/// 单次调用的阶段，仅用于跟踪日志
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReviewPhase {
    BuildingRequest,
    AwaitingProvider,
    Validating,
    Succeeded,
    Failed,
}

/// 审查编排器。
///
/// 持有进程级配置与共享 HTTP 客户端；每次调用构造全新的不可变
/// 请求，走一次适配器往返，校验后返回规范结果或类型化错误。
/// 失败从不自动重试，也不会影响调用方已持有的既有结果。
pub struct ReviewOrchestrator {
    config: Config,
    client: Arc<Client>,
}

impl ReviewOrchestrator {
    /// 用显式注入的配置构造编排器（凭证随配置传入，绝不临时读环境）
    pub fn new(config: Config) -> Result<Self, ReviewError> {
        let client = Arc::new(build_client(&NetworkConfig::default())?);
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 供远程仓库漫游等协作方复用同一个客户端
    pub fn client(&self) -> &Arc<Client> {
        &self.client
    }

    /// 执行一次完整审查：前置检查 → 构造请求 → 适配器往返 → 校验
    pub async fn review(&self, batch: &FileBatch) -> Result<ReviewResult, ReviewError> {
        // 前置检查全部发生在任何网络调用之前
        if batch.is_empty() {
            return Err(ReviewError::EmptyInput);
        }
        self.config
            .validate()
            .map_err(|e| ReviewError::config(e.to_string()))?;

        let request = ReviewRequest::new(batch.clone(), self.config.model_config());
        self.trace_phase(&request.correlation_id, ReviewPhase::BuildingRequest);
        tracing::info!(
            correlation_id = %request.correlation_id,
            provider = %request.model.provider,
            model = %request.model.model,
            files = request.batch.len(),
            "review invocation started"
        );

        let adapter = build_adapter(self.client.clone(), &self.config, &request.model)?;

        self.trace_phase(&request.correlation_id, ReviewPhase::AwaitingProvider);
        let result = match adapter.review(&request).await {
            Ok(result) => result,
            Err(err) => {
                self.trace_phase(&request.correlation_id, ReviewPhase::Failed);
                tracing::error!(
                    correlation_id = %request.correlation_id,
                    error = %err,
                    "review invocation failed"
                );
                return Err(err);
            }
        };

        self.trace_phase(&request.correlation_id, ReviewPhase::Validating);
        let unknown_files = result
            .issues
            .iter()
            .filter(|issue| !request.batch.contains_path(&issue.filename))
            .count();

        self.trace_phase(&request.correlation_id, ReviewPhase::Succeeded);
        tracing::info!(
            correlation_id = %request.correlation_id,
            score = result.score,
            issues = result.issues.len(),
            unknown_files,
            "review invocation succeeded"
        );

        Ok(result)
    }

    /// 单轮聊天跟进。
    ///
    /// 历史由调用方持有，这里只取最新一条消息发送；传输层失败
    /// 或空回复统一替换为兜底文案，其余错误照常上抛。
    pub async fn chat(
        &self,
        history: &ChatHistory,
        message: &str,
        file_names: &[String],
    ) -> Result<String, ReviewError> {
        self.config
            .validate()
            .map_err(|e| ReviewError::config(e.to_string()))?;

        let model = self.config.chat_model_config();
        let request = ChatRequest {
            message: message.to_string(),
            file_names: file_names.to_vec(),
            model,
        };

        tracing::debug!(
            turns = history.len(),
            files = request.file_names.len(),
            "chat invocation started"
        );

        let adapter = build_adapter(self.client.clone(), &self.config, &request.model)?;

        match adapter.chat(&request).await {
            Ok(reply) if reply.trim().is_empty() => {
                tracing::warn!("chat reply was empty, returning fallback");
                Ok(prompt::CHAT_FALLBACK_REPLY.to_string())
            }
            Ok(reply) => Ok(reply),
            Err(err) if err.is_transport_failure() => {
                tracing::warn!(error = %err, "chat transport failure, returning fallback");
                Ok(prompt::CHAT_FALLBACK_REPLY.to_string())
            }
            Err(err) => Err(err),
        }
    }

    fn trace_phase(&self, correlation_id: &str, phase: ReviewPhase) {
        tracing::debug!(correlation_id = %correlation_id, phase = ?phase, "phase transition");
    }
}
