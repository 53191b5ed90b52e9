//! REST APIハンドラー

pub mod error;
pub mod logs;
pub mod trigger;

use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// アプリケーションのルーターを構築する
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/api/trigger", post(trigger::trigger_run))
        .route("/api/status", get(trigger::get_status))
        .route("/api/logs/history", get(logs::get_log_history))
        .route("/ws/logs", get(logs::logs_ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
