//! スケジューラ
//!
//! 固定間隔で実行を起動するバックグラウンドタイマー。実行中にtickが
//! 重なった場合、そのtickは破棄される（繰り越さない）。

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use tokio::time::{interval, Duration};
use tracing::info;

use crate::AppState;

/// 次回実行時刻の共有スロット
///
/// スケジューラが書き込み、状態APIが読み出す。
#[derive(Clone, Debug, Default)]
pub struct ScheduleHandle {
    next_run: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl ScheduleHandle {
    /// 次回の定期実行時刻（スケジューラ未起動ならNone）
    pub fn next_run(&self) -> Option<DateTime<Utc>> {
        *self.next_run.lock().expect("schedule slot lock poisoned")
    }

    fn set_next_run(&self, at: DateTime<Utc>) {
        *self.next_run.lock().expect("schedule slot lock poisoned") = Some(at);
    }
}

/// スケジューラをバックグラウンドで開始する
pub fn start(state: AppState) {
    let interval_secs = state.config.schedule.interval_hours.saturating_mul(3600);
    let run_on_start = state.config.schedule.run_on_start;

    tokio::spawn(async move {
        let mut timer = interval(Duration::from_secs(interval_secs));

        info!(
            interval_hours = state.config.schedule.interval_hours,
            run_on_start, "Keeper scheduler started"
        );

        // interval()は最初のtickが即時に発火する。これが起動時の即時実行に
        // なる。run_on_startが無効な場合は読み捨てて1周期分待つ。
        if !run_on_start {
            timer.tick().await;
            state
                .schedule
                .set_next_run(Utc::now() + chrono::Duration::seconds(interval_secs as i64));
        }

        loop {
            timer.tick().await;
            state
                .schedule
                .set_next_run(Utc::now() + chrono::Duration::seconds(interval_secs as i64));

            if !crate::keeper::try_spawn_run(state.clone()) {
                info!("Scheduled run skipped: a run is already in progress");
            }
        }
    });
}
