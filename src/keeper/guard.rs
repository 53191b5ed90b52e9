//! 実行ガード
//!
//! タイマー起動と手動トリガーの両方が経由する、単一実行（single-flight）の
//! 排他制御。実行中フラグへの生アクセスは公開せず、`try_start`/`RunPermit`の
//! drop経由でのみ遷移する。

use std::sync::{Arc, Mutex};

/// プロセス全体で共有する実行状態
///
/// `try_start`はロック下でtest-and-setを行い、既に実行中なら待機も
/// キューイングもせず即座に拒否する。
#[derive(Clone, Debug, Default)]
pub struct RunGuard {
    running: Arc<Mutex<bool>>,
}

impl RunGuard {
    /// 新しいガードを作成する（初期状態は未実行）
    pub fn new() -> Self {
        Self::default()
    }

    /// 実行権の取得を試みる
    ///
    /// 既に実行中の場合は`None`を返す。取得できた場合、返された
    /// `RunPermit`がdropされるまで他の取得要求はすべて拒否される。
    pub fn try_start(&self) -> Option<RunPermit> {
        let mut running = self.running.lock().expect("run state lock poisoned");
        if *running {
            return None;
        }
        *running = true;
        Some(RunPermit {
            guard: self.clone(),
        })
    }

    /// 実行中かどうか
    pub fn is_running(&self) -> bool {
        *self.running.lock().expect("run state lock poisoned")
    }

    fn finish(&self) {
        let mut running = self.running.lock().expect("run state lock poisoned");
        *running = false;
    }
}

/// 実行権
///
/// drop時に必ず実行状態を解除する。実行本体がパニックで巻き戻った場合も
/// 解除は保証される。
#[derive(Debug)]
pub struct RunPermit {
    guard: RunGuard,
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        self.guard.finish();
    }
}
