use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tencent_docs_rust::{
    config::{AppConfig, DEFAULT_CONFIG_PATH},
    logging::{self, mask_secret},
    CancellationToken, DocsClient, ExportOrchestrator, ExportOutcome, ExportType, ListParams,
    ListType, SearchParams, SearchType, SortType, Token,
};
use tracing::{info, warn};

/// 腾讯文档命令行工具
#[derive(Parser)]
#[command(name = "tencent-docs")]
#[command(about = "Tencent Docs open platform client", version)]
struct Cli {
    /// 配置文件路径
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, global = true)]
    config: String,

    /// 访问令牌（覆盖配置中的 initial_token）
    #[arg(long, global = true)]
    access_token: Option<String>,

    /// 令牌对应的 Open ID
    #[arg(long, global = true)]
    open_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 输出用户授权 URL
    AuthUrl,
    /// 使用授权码换取访问令牌
    Exchange {
        #[arg(long)]
        code: String,
    },
    /// 刷新访问令牌
    Refresh {
        #[arg(long)]
        refresh_token: String,
    },
    /// 当前用户信息
    UserInfo,
    /// 文档列表
    List {
        /// folder / file / all
        #[arg(long, default_value = "folder")]
        list_type: ListType,
        /// browse / time / name
        #[arg(long, default_value = "browse")]
        sort_type: SortType,
        #[arg(long)]
        asc: bool,
        #[arg(long, default_value = "")]
        folder_id: String,
        #[arg(long, default_value_t = 0)]
        start: u32,
        #[arg(long, default_value_t = 20)]
        limit: u32,
        #[arg(long)]
        file_type: Option<String>,
    },
    /// 搜索文档
    Search {
        #[arg(long)]
        key: String,
        /// title / owner
        #[arg(long, default_value = "title")]
        search_type: SearchType,
        #[arg(long, default_value_t = 0)]
        offset: u32,
        #[arg(long, default_value_t = 20)]
        size: u32,
        #[arg(long)]
        file_types: Option<String>,
    },
    /// 文件元数据
    Metadata {
        #[arg(long)]
        file_id: String,
    },
    /// 导出文档并下载到本地
    Export {
        #[arg(long)]
        doc_id: String,
        /// pdf / docx / xlsx / pptx
        #[arg(long)]
        format: Option<ExportType>,
        /// 保存目录（默认使用配置中的 download_dir）
        #[arg(long)]
        dir: Option<PathBuf>,
        #[arg(long)]
        max_attempts: Option<u32>,
        #[arg(long)]
        interval_secs: Option<u64>,
    },
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum ExportReport {
    Downloaded { file_name: String, path: PathBuf },
    TimedOut { progress: u32 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from_file(&cli.config)
        .await
        .with_context(|| format!("加载配置失败: {}", cli.config))?;

    // 必须保持 _log_guard 存活
    let _log_guard = logging::init_logging(&config.log);
    info!("Tencent Docs CLI v{} 启动", env!("CARGO_PKG_VERSION"));
    tracing::debug!(
        "client_id={}, client_secret={}",
        config.client.client_id,
        mask_secret(&config.client.client_secret)
    );

    let client = DocsClient::new(config.client.clone())?;
    if let Some(access_token) = cli.access_token {
        client.set_token(Token::new(access_token, cli.open_id.unwrap_or_default()));
    }

    run(cli.command, client, &config).await
}

async fn run(command: Commands, client: DocsClient, config: &AppConfig) -> anyhow::Result<()> {
    match command {
        Commands::AuthUrl => println!("{}", client.auth_url()?),
        Commands::Exchange { code } => print_json(&client.exchange_token(&code).await?)?,
        Commands::Refresh { refresh_token } => {
            print_json(&client.refresh_token(&refresh_token).await?)?
        }
        Commands::UserInfo => print_json(&client.user_info().await?)?,
        Commands::List {
            list_type,
            sort_type,
            asc,
            folder_id,
            start,
            limit,
            file_type,
        } => {
            let params = ListParams {
                list_type,
                sort_type,
                asc: asc as u8,
                folder_id,
                start,
                limit,
                is_owner: 1,
                file_type,
            };
            print_json(&client.list_documents(&params).await?)?
        }
        Commands::Search {
            key,
            search_type,
            offset,
            size,
            file_types,
        } => {
            let params = SearchParams {
                search_key: key,
                search_type,
                offset,
                size,
                file_types,
                ..Default::default()
            };
            print_json(&client.search_documents(&params).await?)?
        }
        Commands::Metadata { file_id } => print_json(&client.file_metadata(&file_id).await?)?,
        Commands::Export {
            doc_id,
            format,
            dir,
            max_attempts,
            interval_secs,
        } => {
            let mut polling = config.export.polling();
            if let Some(max_attempts) = max_attempts {
                polling.max_attempts = max_attempts;
            }
            if let Some(secs) = interval_secs {
                polling.interval = Duration::from_secs(secs);
            }
            let save_dir = dir.unwrap_or_else(|| config.export.download_dir.clone());

            let cancel = CancellationToken::new();
            let trigger = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("收到 Ctrl-C，正在取消导出");
                    trigger.cancel();
                }
            });

            let orchestrator = ExportOrchestrator::new(Arc::new(client))
                .with_polling(polling)
                .with_progress_callback(|p| info!("导出进度: {}%", p.progress));

            let outcome = orchestrator
                .export_and_download(&doc_id, format, Some(&save_dir), &cancel)
                .await?;

            let report = match outcome {
                ExportOutcome::Downloaded(file) => ExportReport::Downloaded {
                    file_name: file.file_name,
                    path: file.path,
                },
                ExportOutcome::TimedOut(progress) => {
                    warn!("导出未完成，请稍后重试");
                    ExportReport::TimedOut {
                        progress: progress.progress,
                    }
                }
            };
            print_json(&report)?
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
