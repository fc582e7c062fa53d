use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::ai::{prompt, result_processor, AiProvider, ChatRequest, ReviewRequest};
use crate::infrastructure::error::ReviewError;
use crate::models::ReviewResult;

/// 审查调用的思考预算
const THINKING_BUDGET: u32 = 32_768;

/// Gemini 提供商（原生结构化输出）
///
/// 后端按声明的 responseSchema 直接产出规范 JSON，
/// 适配器只负责反序列化。
pub struct GeminiProvider {
    client: Arc<reqwest::Client>,
    api_key: String,
    base_url: String,
}

/// Gemini API 响应结构
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<Part>>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiProvider {
    pub fn new(client: Arc<reqwest::Client>, api_key: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            base_url,
        }
    }

    fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            model,
            self.api_key
        )
    }

    async fn generate(&self, model: &str, body: Value) -> Result<String, ReviewError> {
        let url = self.generate_url(model);

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(ReviewError::transport(
                status,
                format!("Gemini API error: {}", text),
            ));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            ReviewError::malformed(format!("failed to decode Gemini response: {}", e))
        })?;

        let text = parsed
            .candidates
            .unwrap_or_default()
            .into_iter()
            .flat_map(|candidate| {
                candidate
                    .content
                    .and_then(|content| content.parts)
                    .unwrap_or_default()
            })
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("\n");

        Ok(text)
    }
}

#[async_trait]
impl AiProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn review(&self, request: &ReviewRequest) -> Result<ReviewResult, ReviewError> {
        let body = json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{"text": request.prompt}]
                }
            ],
            "generationConfig": {
                "thinkingConfig": {"thinkingBudget": THINKING_BUDGET},
                "responseMimeType": "application/json",
                "responseSchema": review_response_schema()
            }
        });

        let text = self.generate(&request.model.model, body).await?;
        if text.trim().is_empty() {
            return Err(ReviewError::malformed(
                "Gemini returned no text content".to_string(),
            ));
        }

        result_processor::parse_review_result(&text, &request.batch)
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String, ReviewError> {
        let body = json!({
            "systemInstruction": {
                "parts": [{"text": prompt::build_chat_system(&request.file_names)}]
            },
            "contents": [
                {
                    "role": "user",
                    "parts": [{"text": request.message}]
                }
            ]
        });

        self.generate(&request.model.model, body).await
    }
}

/// 审查输出的声明式 JSON Schema
fn review_response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "summary": {"type": "string", "description": "工程整体质量总结"},
            "score": {"type": "number", "description": "健康评分 0-100"},
            "issues": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "id": {"type": "string"},
                        "filename": {"type": "string"},
                        "line": {"type": "number"},
                        "severity": {
                            "type": "string",
                            "enum": ["Critical", "Warning", "Suggestion", "Info"]
                        },
                        "category": {"type": "string", "description": "分类（如：性能, 安全, 规范）"},
                        "title": {"type": "string"},
                        "description": {"type": "string"},
                        "suggestion": {"type": "string"},
                        "codeSnippet": {"type": "string", "description": "修复示例代码或问题片段"}
                    },
                    "required": ["id", "filename", "severity", "category", "title", "description", "suggestion"]
                }
            }
        },
        "required": ["summary", "score", "issues"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_url_joins_base_and_model() {
        let provider = GeminiProvider::new(
            Arc::new(reqwest::Client::new()),
            "k".to_string(),
            "https://generativelanguage.googleapis.com/v1beta/".to_string(),
        );
        assert_eq!(
            provider.generate_url("gemini-3-pro-preview"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-pro-preview:generateContent?key=k"
        );
    }

    #[test]
    fn test_response_schema_requires_canonical_fields() {
        let schema = review_response_schema();
        let required = schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "summary"));
        assert!(required.iter().any(|v| v == "score"));
        assert!(required.iter().any(|v| v == "issues"));

        let issue_required = schema["properties"]["issues"]["items"]["required"]
            .as_array()
            .unwrap();
        assert_eq!(issue_required.len(), 7);
    }

    #[test]
    fn test_candidate_text_extraction() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}]}}
            ]
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let text = parsed
            .candidates
            .unwrap()
            .into_iter()
            .flat_map(|c| c.content.and_then(|c| c.parts).unwrap_or_default())
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(text, "{\"a\":\n1}");
    }

    #[test]
    fn test_empty_candidates_deserialize() {
        let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.candidates.is_none());
    }
}
