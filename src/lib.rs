//! LLM Keeper
//!
//! OpenAI互換チャット補完エンドポイントを定期的に呼び出してウォーム状態に
//! 保つデーモン。優先度順フォールバックでプロンプトを1件生成し、有効な
//! 全エンドポイントへ送信して結果を記録する。

#![warn(missing_docs)]

/// REST APIハンドラー
pub mod api;

/// エンドポイントクライアント（送信・応答正規化）
pub mod client;

/// 設定管理
pub mod config;

/// エラー型定義
pub mod error;

/// ライブログイベントバス
pub mod events;

/// 実行制御（実行ガード・ディスパッチャ）
pub mod keeper;

/// リクエストロガー
pub mod logger;

/// ロギング初期化ユーティリティ
pub mod logging;

/// スケジューラ
pub mod scheduler;

/// axumサーバー
pub mod server;

/// プロンプト生成戦略
pub mod strategy;

/// ディスパッチ結果の型定義
pub mod types;

use crate::error::{KeeperError, KeeperResult};
use std::sync::Arc;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// 読み込み済み設定
    pub config: Arc<config::KeeperConfig>,
    /// 共有HTTPクライアント（接続プーリング有効）
    pub http_client: reqwest::Client,
    /// 構築済みの戦略（有効なもののみ、優先度昇順）
    pub strategies: Arc<Vec<Box<dyn strategy::PromptStrategy>>>,
    /// 実行ガード
    pub run_guard: keeper::guard::RunGuard,
    /// 次回実行時刻の共有スロット
    pub schedule: scheduler::ScheduleHandle,
    /// リクエストロガー
    pub logger: Arc<logger::RequestLogger>,
    /// ライブログイベントバス
    pub log_bus: events::SharedLogBus,
}

impl AppState {
    /// 検証済み設定からアプリケーション状態を構築する
    pub fn from_config(config: config::KeeperConfig) -> KeeperResult<Self> {
        let http_client = reqwest::Client::builder()
            .build()
            .map_err(|err| KeeperError::Http(err.to_string()))?;

        let strategies = strategy::build_strategies(&config.request_strategies, &http_client)?;

        let log_bus = events::create_shared_log_bus();
        let logger = Arc::new(logger::RequestLogger::new(&config.logging.path, log_bus.clone()));

        Ok(Self {
            config: Arc::new(config),
            http_client,
            strategies: Arc::new(strategies),
            run_guard: keeper::guard::RunGuard::new(),
            schedule: scheduler::ScheduleHandle::default(),
            logger,
            log_bus,
        })
    }
}
