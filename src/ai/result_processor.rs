use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::infrastructure::error::ReviewError;
use crate::models::{FileBatch, ReviewIssue, ReviewResult};

// 匹配整段被 Markdown 代码围栏包裹的响应
static FENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*```[a-zA-Z]*\s*\n?(.*?)\n?\s*```\s*$").unwrap()
});

/// 提供商输出的原始载荷：结构必填，数值宽松
#[derive(Debug, Deserialize)]
struct ReviewPayload {
    summary: String,
    score: f64,
    issues: Vec<ReviewIssue>,
}

/// 剥离聊天补全后端常见的 ```json 围栏。
/// 对未加围栏的纯 JSON 是幂等空操作。
pub fn strip_code_fences(raw: &str) -> String {
    match FENCE_RE.captures(raw) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()).trim().to_owned(),
        None => raw.trim().to_owned(),
    }
}

/// 把提供商文本反序列化为规范的 ReviewResult。
///
/// 结构性失败（JSON 不合法、必填字段缺失、score 非数值）一律归为
/// ResponseMalformed；软性违例（score 越界、filename 未命中批次）
/// 仅记录日志，不拒绝整个结果。
pub fn parse_review_result(raw: &str, batch: &FileBatch) -> Result<ReviewResult, ReviewError> {
    let cleaned = strip_code_fences(raw);
    let payload: ReviewPayload = serde_json::from_str(&cleaned).map_err(|e| {
        tracing::debug!(error = %e, raw = %truncate(raw, 400), "provider payload failed to parse");
        ReviewError::malformed(e.to_string())
    })?;

    if !payload.score.is_finite() {
        return Err(ReviewError::malformed(format!(
            "score is not a finite number: {}",
            payload.score
        )));
    }

    let score = clamp_score(payload.score);

    for issue in &payload.issues {
        if !batch.contains_path(&issue.filename) {
            tracing::warn!(
                issue = %issue.id,
                filename = %issue.filename,
                "issue references a file outside the review batch"
            );
        }
    }

    Ok(ReviewResult {
        summary: payload.summary,
        score,
        issues: payload.issues,
    })
}

fn clamp_score(score: f64) -> u8 {
    if !(0.0..=100.0).contains(&score) {
        tracing::warn!(score, "provider score outside 0..=100, clamping");
    }
    score.clamp(0.0, 100.0).round() as u8
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
