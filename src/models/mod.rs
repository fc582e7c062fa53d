use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 问题严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    #[serde(alias = "critical")]
    Critical,
    #[serde(alias = "warning")]
    Warning,
    #[serde(alias = "suggestion")]
    Suggestion,
    #[serde(alias = "info")]
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::Warning => "Warning",
            Severity::Suggestion => "Suggestion",
            Severity::Info => "Info",
        }
    }
}

/// 单个审查问题
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewIssue {
    pub id: String,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    pub severity: Severity,
    pub category: String,
    pub title: String,
    pub description: String,
    pub suggestion: String,
    #[serde(
        rename = "codeSnippet",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub code_snippet: Option<String>,
}

/// 审查结果：所有提供商统一归一化到该结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewResult {
    pub summary: String,
    /// 健康评分，恒定落在 0..=100
    pub score: u8,
    pub issues: Vec<ReviewIssue>,
}

/// 参与审查的源文件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// 一次审查提交的文件集合。
///
/// 保持插入顺序（即发现顺序）；路径唯一，重复写入同一路径时
/// 旧条目被移除、新条目追加到末尾。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileBatch {
    files: Vec<SourceFile>,
}

impl FileBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入一个文件，同名路径后写覆盖先写
    pub fn push(&mut self, file: SourceFile) {
        self.files.retain(|f| f.path != file.path);
        self.files.push(file);
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.files.iter().any(|f| f.path == path)
    }

    pub fn file_names(&self) -> Vec<String> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}

impl From<Vec<SourceFile>> for FileBatch {
    fn from(files: Vec<SourceFile>) -> Self {
        let mut batch = FileBatch::new();
        for file in files {
            batch.push(file);
        }
        batch
    }
}

/// 对话角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// 单条对话消息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// 会话内的对话历史，只追加、不改写
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatHistory {
    turns: Vec<ChatMessage>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: ChatMessage) {
        self.turns.push(message);
    }

    pub fn turns(&self) -> &[ChatMessage] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// 远程仓库托管提供商
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteProvider {
    GitHub,
    Bitbucket,
}

/// 远程仓库坐标与凭证
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub provider: RemoteProvider,
    /// GitHub owner 或 Bitbucket workspace
    pub owner: String,
    pub repo: String,
    pub branch: String,
    /// GitHub Token（公开仓库可匿名）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Bitbucket 用户名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Bitbucket App Password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_password: Option<String>,
}

/// 一次调用选定的模型配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// 提供商名称（注册表键，如 gemini / openrouter / qwen / glm）
    pub provider: String,
    pub model: String,
    /// 显式端点覆盖，缺省时使用注册表默认 URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}
