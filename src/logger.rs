//! リクエストロガー
//!
//! コアが発行する4種類のログイベント（リクエスト結果・戦略失敗・情報・エラー）を
//! tracing、リクエスト詳細ログ（JSONL）、ライブイベントバスの3系統へ集約する。

use crate::events::{LogEventKind, SharedLogBus};
use crate::strategy::StrategyKind;
use crate::types::DispatchResult;
use chrono::Utc;
use serde_json::json;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// リクエスト詳細ログのファイル名
const DETAIL_LOG_FILE: &str = "request_details.jsonl";

/// コアが呼び出すログイベントのインターフェース
///
/// 戦略リゾルバとディスパッチャはこの4メソッドだけを呼ぶ。
pub trait KeeperLog: Send + Sync {
    /// エンドポイントへの送信結果（成功・失敗どちらも）
    fn log_request(&self, strategy: StrategyKind, result: &DispatchResult);
    /// 戦略のプロンプト生成失敗
    fn log_strategy_failure(&self, strategy: StrategyKind, reason: &str);
    /// 情報メッセージ
    fn log_info(&self, message: &str);
    /// エラーメッセージ
    fn log_error(&self, message: &str);
}

/// 本番用ロガー
///
/// tracing経由でメインログ（コンソール + ローテーションファイル）へ、
/// 成功したリクエストは`request_details.jsonl`へ1行ずつ追記し、
/// すべてのイベントをライブバスへ発行する。
pub struct RequestLogger {
    detail_path: PathBuf,
    bus: SharedLogBus,
}

impl RequestLogger {
    /// ログディレクトリとイベントバスからロガーを作成する
    pub fn new(log_dir: &Path, bus: SharedLogBus) -> Self {
        Self {
            detail_path: log_dir.join(DETAIL_LOG_FILE),
            bus,
        }
    }

    /// リクエスト詳細ログのパス
    pub fn detail_log_path(&self) -> &Path {
        &self.detail_path
    }

    fn append_detail(&self, line: &str) {
        let result = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.detail_path)
            .and_then(|mut file| writeln!(file, "{line}"));
        if let Err(err) = result {
            warn!(
                path = %self.detail_path.display(),
                error = %err,
                "Failed to append request detail log"
            );
        }
    }
}

impl KeeperLog for RequestLogger {
    fn log_request(&self, strategy: StrategyKind, result: &DispatchResult) {
        if result.success {
            let total_tokens = result.usage.as_ref().map(|u| u.total_tokens).unwrap_or(0);
            let model = result.model.as_deref().unwrap_or("unknown");
            let msg = format!(
                "API: {} | Strategy: {} | Tokens: {} | Model: {}",
                result.api_name, strategy, total_tokens, model
            );
            info!("{msg}");
            self.bus.publish(LogEventKind::Info, msg);

            let entry = json!({
                "timestamp": Utc::now().to_rfc3339(),
                "api_name": result.api_name,
                "strategy": strategy.as_str(),
                "prompt": result.prompt,
                "response": result.response_text,
                "usage": result.usage,
                "model": result.model,
            });
            let line = entry.to_string();
            self.append_detail(&line);
            self.bus.publish(LogEventKind::Detail, line);
        } else {
            let msg = format!(
                "API: {} | Strategy: {} | Error: {}",
                result.api_name,
                strategy,
                result.error.as_deref().unwrap_or("Unknown error")
            );
            error!("{msg}");
            self.bus.publish(LogEventKind::Error, msg);
        }
    }

    fn log_strategy_failure(&self, strategy: StrategyKind, reason: &str) {
        let msg = format!("Strategy {strategy} failed: {reason}");
        warn!("{msg}");
        self.bus.publish(LogEventKind::Warning, msg);
    }

    fn log_info(&self, message: &str) {
        info!("{message}");
        self.bus.publish(LogEventKind::Info, message);
    }

    fn log_error(&self, message: &str) {
        error!("{message}");
        self.bus.publish(LogEventKind::Error, message);
    }
}
