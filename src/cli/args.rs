use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(
    name = "codelens",
    version,
    about = "AI 代码评审工具 - 支持本地文件与 GitHub/Bitbucket 远程仓库",
    long_about = "codelens 将一组源文件提交给 AI 后端进行结构化代码评审。\
支持 Gemini 原生结构化输出及 OpenRouter/Qwen/GLM 等 OpenAI 兼容后端，\
可直接递归拉取远程仓库中符合条件的源文件。"
)]
pub struct Args {
    /// AI provider to use (gemini, openrouter, qwen, or glm)
    #[arg(short = 'P', long, default_value = "")] // 空字符串表示未指定
    pub provider: String,

    /// Model to use (default: provider-specific)
    #[arg(short, long, default_value = "")] // 空字符串表示未指定
    pub model: String,

    /// 远程仓库提供商（github 或 bitbucket），不指定则审查本地文件
    #[arg(long, value_name = "PROVIDER")]
    pub remote: Option<String>,

    /// GitHub owner 或 Bitbucket workspace
    #[arg(long, default_value = "")]
    pub owner: String,

    /// 仓库名
    #[arg(long, default_value = "")]
    pub repo: String,

    /// 分支名
    #[arg(long, default_value = "main")]
    pub branch: String,

    /// GitHub Token（公开仓库可省略）
    #[arg(long)]
    pub token: Option<String>,

    /// Bitbucket 用户名
    #[arg(long)]
    pub username: Option<String>,

    /// Bitbucket App Password
    #[arg(long = "app-password")]
    pub app_password: Option<String>,

    /// 针对当前文件集提出一个追问，而不是执行评审
    #[arg(long, value_name = "MESSAGE")]
    pub chat: Option<String>,

    /// 输出格式 (text 或 json)
    #[arg(long, default_value = "text")]
    pub format: String,

    /// 输出调试日志
    #[arg(long, default_value_t = false)]
    pub debug: bool,

    /// 要审查的本地文件
    #[arg(value_name = "FILES")]
    pub files: Vec<String>,
}
