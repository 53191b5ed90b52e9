//! 実行トリガー・状態API
//!
//! ダッシュボード等の外部コラボレータが消費するインターフェース。
//! トリガーは即時に受理/拒否を返し、実行完了は待たない。

use crate::{keeper, AppState};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

/// GET /api/status のレスポンス
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    /// 実行中かどうか
    pub running: bool,
    /// 次回の定期実行時刻（RFC3339、スケジューラ未起動ならnull）
    pub next_scheduled_run: Option<DateTime<Utc>>,
}

/// POST /api/trigger
///
/// 実行中でなければワーカーを起動して202を返す。実行中なら409で
/// 拒否する。拒否は区別可能なシグナルであってエラーではない。
pub async fn trigger_run(State(state): State<AppState>) -> impl IntoResponse {
    if keeper::try_spawn_run(state) {
        (
            StatusCode::ACCEPTED,
            Json(json!({
                "status": "accepted",
                "message": "run started"
            })),
        )
    } else {
        (
            StatusCode::CONFLICT,
            Json(json!({
                "status": "rejected",
                "message": "a run is already in progress"
            })),
        )
    }
}

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        running: state.run_guard.is_running(),
        next_scheduled_run: state.schedule.next_run(),
    })
}
