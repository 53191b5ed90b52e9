//! ロギング初期化ユーティリティ
//!
//! コンソールと日次ローテーションファイルの2系統へ出力する。

use crate::error::{KeeperError, KeeperResult};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// メインログファイルのプレフィックス
const LOG_FILE_PREFIX: &str = "llmkeeper.log";

/// tracingを初期化する
///
/// `RUST_LOG`が設定されていればそちらを優先し、なければ設定ファイルの
/// レベル指定を使う。戻り値の`WorkerGuard`はプロセス終了までdropしないこと
/// （dropするとファイル出力がフラッシュされなくなる）。
pub fn init(log_dir: &Path, level: &str) -> KeeperResult<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .try_init()
        .map_err(|err| KeeperError::Internal(format!("failed to initialize logging: {err}")))?;

    Ok(guard)
}

/// 当日分のメインログファイルパスを返す
///
/// `tracing_appender::rolling::daily`は`<prefix>.YYYY-MM-DD`形式（UTC）で出力する。
pub fn log_file_path(log_dir: &Path) -> PathBuf {
    let date = chrono::Utc::now().format("%Y-%m-%d");
    log_dir.join(format!("{LOG_FILE_PREFIX}.{date}"))
}
