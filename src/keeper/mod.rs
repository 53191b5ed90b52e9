//! 実行制御
//!
//! 1回分の実行（戦略解決 + ディスパッチ）と、実行ガードを経由した
//! ワーカー起動。タイマーと手動トリガーはどちらも`try_spawn_run`を呼ぶ。

pub mod dispatcher;
pub mod guard;

use crate::logger::KeeperLog;
use crate::strategy::resolver;
use crate::AppState;
use tracing::info;

/// 1回分の実行本体
///
/// 呼び出し側が実行権（`RunPermit`）を保持していること。実行そのものは
/// プロセスを落とさない。最悪でも「全件失敗がログに残る」で終わる。
pub async fn run_keeper_task(state: &AppState) {
    let logger = state.logger.as_ref();

    logger.log_info(&"=".repeat(50));
    logger.log_info("LLM Keeper run started");
    logger.log_info(&"=".repeat(50));

    let endpoints = state.config.enabled_apis();
    if endpoints.is_empty() {
        logger.log_error("No enabled APIs found in configuration");
        return;
    }
    logger.log_info(&format!("Found {} enabled API(s)", endpoints.len()));

    let Some((prompt, strategy)) = resolver::resolve(&state.strategies, logger).await else {
        // リゾルバが実行レベルのエラーを記録済み。ディスパッチは行わない。
        return;
    };

    logger.log_info(&format!("Generated prompt using strategy: {strategy}"));

    let summary = dispatcher::dispatch(
        &state.http_client,
        &prompt,
        strategy,
        &endpoints,
        logger,
    )
    .await;

    logger.log_info(&format!(
        "Summary: {} succeeded, {} failed",
        summary.success_count, summary.failure_count
    ));
}

/// 実行権を取得できた場合のみワーカーを起動する
///
/// 戻り値は受理可否。拒否された要求は破棄され、キューイングされない。
/// 呼び出し元（タイマーtick・HTTPハンドラ）は実行完了を待たずに戻る。
pub fn try_spawn_run(state: AppState) -> bool {
    let Some(permit) = state.run_guard.try_start() else {
        return false;
    };

    tokio::spawn(async move {
        // 実行終了で必ず解放される（パニック時も含む）
        let _permit = permit;
        run_keeper_task(&state).await;
    });

    info!("Keeper run dispatched to worker");
    true
}
