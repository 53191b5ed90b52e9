//! ログ閲覧・配信API
//!
//! `/api/logs/history`で過去ログの末尾を、`/ws/logs`でライブイベントを
//! 提供する。

use super::error::AppError;
use crate::error::KeeperError;
use crate::events::SharedLogBus;
use crate::{logging, AppState};
use axum::extract::ws::{Message, WebSocket};
use axum::{
    extract::{Query, State, WebSocketUpgrade},
    response::IntoResponse,
    Json,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::broadcast;
use tracing::debug;

/// デフォルトの取得行数
const DEFAULT_LIMIT: usize = 200;
/// 取得行数の上限
const MAX_LIMIT: usize = 1000;

/// ログ取得クエリパラメーター
#[derive(Debug, Clone, Deserialize)]
pub struct LogQuery {
    /// 取得件数（1-1000）
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

/// GET /api/logs/history のレスポンス
#[derive(Debug, Clone, Serialize)]
pub struct LogHistoryResponse {
    /// メインログの末尾
    pub main: Vec<String>,
    /// リクエスト詳細ログ（JSONL）の末尾
    pub detail: Vec<String>,
}

/// GET /api/logs/history
pub async fn get_log_history(
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
) -> Result<Json<LogHistoryResponse>, AppError> {
    let limit = query.limit.clamp(1, MAX_LIMIT);

    let main_path = logging::log_file_path(&state.config.logging.path);
    let detail_path = state.logger.detail_log_path().to_path_buf();

    let main = tail_lines(&main_path, limit).await?;
    let detail = tail_lines(&detail_path, limit).await?;

    Ok(Json(LogHistoryResponse { main, detail }))
}

/// ファイル末尾からlimit行を読み出す（ファイルが無ければ空）
async fn tail_lines(path: &Path, limit: usize) -> Result<Vec<String>, AppError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(KeeperError::Io(err).into()),
    };

    let lines: Vec<String> = content.lines().map(str::to_string).collect();
    let start = lines.len().saturating_sub(limit);
    Ok(lines[start..].to_vec())
}

/// GET /ws/logs — ライブログ配信へのWebSocketアップグレード
pub async fn logs_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.log_bus.clone()))
}

async fn handle_socket(socket: WebSocket, bus: SharedLogBus) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = bus.subscribe();

    debug!("Log stream client connected");

    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) | Err(_) => break,
                _ => {}
            }
        }
    });

    loop {
        tokio::select! {
            _ = &mut recv_task => break,
            event = events.recv() => match event {
                Ok(event) => {
                    let Ok(text) = serde_json::to_string(&event) else {
                        continue;
                    };
                    if sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                // 遅いクライアントは取りこぼす。バックプレッシャはかけない。
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "log stream client lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    recv_task.abort();
    debug!("Log stream client disconnected");
}
