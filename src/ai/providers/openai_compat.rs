use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ai::{prompt, result_processor, AiProvider, ChatRequest, ReviewRequest};
use crate::infrastructure::error::ReviewError;
use crate::models::ReviewResult;

/// 低采样温度，偏向确定性的、遵循 schema 的输出
const REVIEW_TEMPERATURE: f64 = 0.1;

/// OpenAI 兼容提供商（聊天补全族：OpenRouter、Qwen、GLM）
///
/// 这些后端共享一种请求/响应形状，但不保证输出纯 JSON，
/// 解析前先剥离 Markdown 代码围栏。
pub struct OpenAiCompatProvider {
    client: Arc<reqwest::Client>,
    name: String,
    api_key: String,
    url: String,
    json_mode: bool,
}

/// 聊天补全 API 请求结构
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

/// 消息结构
#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

/// JSON 输出模式
#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

/// 聊天补全 API 响应结构
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}

impl OpenAiCompatProvider {
    pub fn new(
        client: Arc<reqwest::Client>,
        name: String,
        api_key: String,
        url: String,
        json_mode: bool,
    ) -> Self {
        Self {
            client,
            name,
            api_key,
            url,
            json_mode,
        }
    }

    async fn complete(&self, request: &ChatCompletionRequest) -> Result<String, ReviewError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(ReviewError::transport(
                status,
                format!("{} API error: {}", self.name, text),
            ));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            ReviewError::malformed(format!(
                "failed to decode chat completions response: {}",
                e
            ))
        })?;

        let content = parsed
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .ok_or_else(|| {
                ReviewError::malformed(format!("{} returned no choices", self.name))
            })?;

        Ok(content)
    }
}

#[async_trait]
impl AiProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn review(&self, request: &ReviewRequest) -> Result<ReviewResult, ReviewError> {
        let api_request = ChatCompletionRequest {
            model: request.model.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            temperature: REVIEW_TEMPERATURE,
            response_format: self.json_mode.then(|| ResponseFormat {
                kind: "json_object".to_string(),
            }),
        };

        let content = self.complete(&api_request).await?;
        result_processor::parse_review_result(&content, &request.batch)
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String, ReviewError> {
        let api_request = ChatCompletionRequest {
            model: request.model.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: prompt::build_chat_system(&request.file_names),
                },
                Message {
                    role: "user".to_string(),
                    content: request.message.clone(),
                },
            ],
            temperature: REVIEW_TEMPERATURE,
            // 自由文本回复，不申请 JSON 模式
            response_format: None,
        };

        self.complete(&api_request).await
    }
}
