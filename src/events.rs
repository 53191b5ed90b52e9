//! ライブログイベントバス
//!
//! 実行中のログイベントをWebSocketクライアントへブロードキャストするための基盤。
//! 購読者がいなくても発行は失敗せず、遅い購読者にはバックプレッシャをかけない。

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

/// イベントバスのチャネル容量
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// ログイベントの種別
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogEventKind {
    /// 情報
    Info,
    /// 警告
    Warning,
    /// エラー
    Error,
    /// リクエスト詳細（JSONレコード）
    Detail,
}

/// WebSocketクライアントへ配信されるログイベント
#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    /// 発生時刻
    pub timestamp: DateTime<Utc>,
    /// 種別
    pub kind: LogEventKind,
    /// メッセージ本文
    pub message: String,
}

/// ライブログイベントバス
#[derive(Debug)]
pub struct LogEventBus {
    sender: broadcast::Sender<LogEvent>,
}

impl Default for LogEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl LogEventBus {
    /// 新しいイベントバスを作成
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// イベントバスを購読
    pub fn subscribe(&self) -> broadcast::Receiver<LogEvent> {
        self.sender.subscribe()
    }

    /// イベントを発行
    ///
    /// 購読者がいない場合は送信に失敗するが、無視する
    pub fn publish(&self, kind: LogEventKind, message: impl Into<String>) {
        let _ = self.sender.send(LogEvent {
            timestamp: Utc::now(),
            kind,
            message: message.into(),
        });
    }

    /// 現在の購読者数を取得
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Arc でラップされたイベントバス
pub type SharedLogBus = Arc<LogEventBus>;

/// 共有可能なイベントバスを作成
pub fn create_shared_log_bus() -> SharedLogBus {
    Arc::new(LogEventBus::new())
}
