//! 解析中のアクティビティログ表示
//!
//! 実際のリクエストとは独立したtokioタスクで、固定ステップを
//! ランダム間隔で進める。最終ステップで止まり、dropでキャンセルされる。

use indicatif::{ProgressBar, ProgressStyle};
use plate_triage_common::progress::{step_delay, ProgressLog, LOG_COMPLETE_MESSAGE};
use rand::Rng;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// 表示設定
#[derive(Debug, Clone)]
pub struct PresenterConfig {
    /// 1時間単位の長さ（ステップ間隔は1.5〜2.5単位）
    pub unit: Duration,
    /// 端末に描画しない（テスト用）
    pub hidden: bool,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            unit: Duration::from_secs(1),
            hidden: false,
        }
    }
}

impl PresenterConfig {
    pub fn hidden(unit: Duration) -> Self {
        Self { unit, hidden: true }
    }
}

/// 実行中のアクティビティログ
pub struct ProgressPresenter {
    task: JoinHandle<()>,
    step_rx: watch::Receiver<usize>,
    bar: ProgressBar,
}

impl ProgressPresenter {
    /// タイマーを開始する（tokioランタイム内で呼ぶこと）
    pub fn start(config: &PresenterConfig) -> Self {
        let bar = if config.hidden {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template("{spinner:.blue} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar.enable_steady_tick(Duration::from_millis(120));
            bar
        };

        let (step_tx, step_rx) = watch::channel(0);
        let task = tokio::spawn(run_steps(config.unit, step_tx, bar.clone()));

        Self { task, step_rx, bar }
    }

    /// 現在のステップ番号
    pub fn current_step(&self) -> usize {
        *self.step_rx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.step_rx.clone()
    }

    /// タイマーを破棄する
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for ProgressPresenter {
    fn drop(&mut self) {
        self.task.abort();
        self.bar.finish_and_clear();
    }
}

async fn run_steps(unit: Duration, step_tx: watch::Sender<usize>, bar: ProgressBar) {
    let mut log = ProgressLog::new();
    bar.set_message(log.active_message());

    while !log.is_final() {
        let sample: f64 = rand::rng().random();
        tokio::time::sleep(step_delay(sample, unit)).await;

        bar.println(format!("  [OK] {}", log.active_message()));
        log.advance();
        bar.set_message(log.active_message());
        let _ = step_tx.send(log.active_step());
    }

    bar.println(format!("  {}", LOG_COMPLETE_MESSAGE));
    // 最終ステップのまま、停止されるまで送信側を保持する
    step_tx.closed().await;
}
