//! ディスパッチャ
//!
//! 解決済みプロンプトを有効な全エンドポイントへ順次送信し、成功・失敗を
//! 集計する。エンドポイント同士は互いに影響しない。1件の障害（パニック
//! 含む）があっても残りの処理は続行される。

use crate::client::EndpointClient;
use crate::config::EndpointConfig;
use crate::logger::KeeperLog;
use crate::strategy::StrategyKind;

/// 1回のディスパッチの集計結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// 成功したエンドポイント数
    pub success_count: usize,
    /// 失敗したエンドポイント数
    pub failure_count: usize,
}

/// プロンプトを全エンドポイントへ送信する
///
/// 個々の送信は専用タスク上で実行する。送信処理がパニックした場合は
/// joinエラーとして回収し、そのエンドポイントの失敗として集計する。
/// すべての結果は成否を問わずロガーへ転送される。
pub async fn dispatch(
    client: &reqwest::Client,
    prompt: &str,
    strategy: StrategyKind,
    endpoints: &[EndpointConfig],
    logger: &dyn KeeperLog,
) -> DispatchSummary {
    let mut summary = DispatchSummary::default();

    for endpoint in endpoints {
        logger.log_info(&format!("Sending request to API: {}", endpoint.name));

        let endpoint_client = EndpointClient::new(client.clone(), endpoint.clone());
        let prompt_owned = prompt.to_string();
        let outcome =
            tokio::spawn(async move { endpoint_client.send(&prompt_owned).await }).await;

        match outcome {
            Ok(result) => {
                if result.success {
                    summary.success_count += 1;
                } else {
                    summary.failure_count += 1;
                }
                logger.log_request(strategy, &result);
            }
            Err(err) => {
                logger.log_error(&format!(
                    "Failed to send request to {}: {err}",
                    endpoint.name
                ));
                summary.failure_count += 1;
            }
        }
    }

    summary
}
