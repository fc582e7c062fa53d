use anyhow::Context;
use clap::Parser;
use codelens::cli::args::Args;
use codelens::config::Config;
use codelens::infrastructure::logging::{setup_logging, LoggingConfig};
use codelens::models::{ChatHistory, FileBatch, RemoteConfig, RemoteProvider, SourceFile};
use codelens::remote::{self, filter};
use codelens::review::ReviewOrchestrator;
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::new();
    config.update_from_args(&args);

    let mut logging = LoggingConfig::default();
    if config.debug {
        logging.level = Level::DEBUG;
    }
    setup_logging(logging)?;

    config
        .validate()
        .context("配置校验失败，请检查提供商与 API Key 设置")?;

    let orchestrator = ReviewOrchestrator::new(config)?;

    let batch = if let Some(remote_provider) = &args.remote {
        let remote = build_remote_config(&args, remote_provider)?;
        remote::fetch_remote_batch(orchestrator.client().as_ref(), orchestrator.config(), &remote)
            .await?
    } else {
        load_local_batch(&args.files)?
    };

    if let Some(message) = &args.chat {
        let history = ChatHistory::new();
        let reply = orchestrator
            .chat(&history, message, &batch.file_names())
            .await?;
        println!("{}", reply);
        return Ok(());
    }

    let result = orchestrator.review(&batch).await?;

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print_text_report(&result),
    }

    Ok(())
}

fn build_remote_config(args: &Args, provider: &str) -> anyhow::Result<RemoteConfig> {
    let provider = match provider {
        "github" => RemoteProvider::GitHub,
        "bitbucket" => RemoteProvider::Bitbucket,
        other => anyhow::bail!("未知的远程仓库提供商: {other}（支持 github / bitbucket）"),
    };

    Ok(RemoteConfig {
        provider,
        owner: args.owner.clone(),
        repo: args.repo.clone(),
        branch: args.branch.clone(),
        token: args.token.clone(),
        username: args.username.clone(),
        app_password: args.app_password.clone(),
    })
}

/// 按与远程漫游相同的过滤规则装载本地文件
fn load_local_batch(paths: &[String]) -> anyhow::Result<FileBatch> {
    let mut batch = FileBatch::new();

    for path in paths {
        if batch.len() >= filter::MAX_REVIEW_FILES {
            eprintln!("⚠️ 已达到 {} 个文件上限，其余文件被忽略", filter::MAX_REVIEW_FILES);
            break;
        }

        let metadata = std::fs::metadata(path).with_context(|| format!("无法读取 {path}"))?;
        if !filter::accept(path, metadata.len()) {
            eprintln!("⚠️ 跳过不符合条件的文件: {path}");
            continue;
        }

        let content =
            std::fs::read_to_string(path).with_context(|| format!("无法读取 {path}"))?;
        batch.push(SourceFile::new(path.clone(), content));
    }

    Ok(batch)
}

fn print_text_report(result: &codelens::models::ReviewResult) {
    println!("📋 {}", result.summary);
    println!("🏆 综合评分: {}/100", result.score);
    println!("🔍 检测到 {} 处问题", result.issues.len());
    println!();

    for issue in &result.issues {
        let location = match issue.line {
            Some(line) => format!("{}:{}", issue.filename, line),
            None => issue.filename.clone(),
        };
        println!(
            "[{}] {} - {} ({})",
            issue.severity.as_str(),
            issue.category,
            issue.title,
            location
        );
        println!("    {}", issue.description);
        println!("    💡 {}", issue.suggestion);
        if let Some(snippet) = &issue.code_snippet {
            println!("    ```\n    {}\n    ```", snippet.replace('\n', "\n    "));
        }
        println!();
    }
}
