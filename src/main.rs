//! LLM Keeper Server Entry Point

use anyhow::Context;
use clap::Parser;
use llmkeeper::{config::KeeperConfig, logging, scheduler, server, AppState};

/// コマンドライン引数
#[derive(Debug, Parser)]
#[command(
    name = "llmkeeper",
    version,
    about = "Keep-warm daemon for OpenAI-compatible chat completion endpoints"
)]
struct Cli {
    /// 設定ファイルのパス
    #[arg(short, long, env = "LLMKEEPER_CONFIG", default_value = "config.yaml")]
    config: std::path::PathBuf,

    /// バインドするホスト（設定ファイルより優先）
    #[arg(long, env = "LLMKEEPER_HOST")]
    host: Option<String>,

    /// バインドするポート（設定ファイルより優先）
    #[arg(short, long, env = "LLMKEEPER_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = KeeperConfig::load(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let _log_guard = logging::init(&config.logging.path, &config.logging.level)?;

    let bind_addr = config.server.bind_addr();
    let state = AppState::from_config(config)?;

    scheduler::start(state.clone());

    server::run(state, &bind_addr).await
}
