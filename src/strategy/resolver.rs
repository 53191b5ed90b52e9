//! 戦略リゾルバ
//!
//! 優先度昇順に各戦略の`generate()`を1回ずつ試し、最初に成功した
//! プロンプトを採用する。失敗した戦略を同一実行内で再試行することはない。

use super::{PromptStrategy, StrategyKind};
use crate::logger::KeeperLog;

/// プロンプトを解決する
///
/// 入力は有効な戦略のみを優先度昇順に並べたリストであること。
/// すべての戦略が失敗した場合は実行レベルのエラーを1回だけ記録して
/// `None`を返す。
pub async fn resolve(
    strategies: &[Box<dyn PromptStrategy>],
    logger: &dyn KeeperLog,
) -> Option<(String, StrategyKind)> {
    for strategy in strategies {
        let kind = strategy.kind();
        logger.log_info(&format!("Trying strategy: {kind}"));

        match strategy.generate().await {
            Some(prompt) if !prompt.is_empty() => {
                logger.log_info(&format!("Strategy {kind} succeeded"));
                return Some((prompt, kind));
            }
            _ => logger.log_strategy_failure(kind, "no prompt generated"),
        }
    }

    logger.log_error("All strategies failed, no prompt generated");
    None
}
