//! 解析中アクティビティログのステップ定義
//!
//! 実際のリクエスト進捗とは無関係な演出用。
//! タイマー駆動部分はCLI側（tokioタスク）が持つ。

use std::time::Duration;

/// 表示するステップ（順序固定）
pub const LOG_STEPS: &[&str] = &[
    "Scanning data plate image...",
    "Extracting Model & Serial Numbers...",
    "Searching manufacturer database...",
    "Decoding serial number nomenclature...",
    "Verifying warranty terms...",
    "Calculating age and depreciation...",
    "Finalizing triage recommendation...",
];

/// 最終ステップ到達時に出すメッセージ
pub const LOG_COMPLETE_MESSAGE: &str = "Analysis Complete. Generating Report.";

/// ステップ間隔の下限（時間単位）
pub const MIN_STEP_DELAY_UNITS: f64 = 1.5;

/// ステップ間隔の上限（時間単位）
pub const MAX_STEP_DELAY_UNITS: f64 = 2.5;

/// アクティビティログの状態
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressLog {
    active: usize,
}

impl ProgressLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 現在のステップ番号（0始まり）
    pub fn active_step(&self) -> usize {
        self.active
    }

    pub fn active_message(&self) -> &'static str {
        LOG_STEPS[self.active]
    }

    pub fn is_final(&self) -> bool {
        self.active + 1 >= LOG_STEPS.len()
    }

    /// 次のステップへ進める。最終ステップではそれ以上進まない
    ///
    /// # Returns
    /// 進んだ場合はtrue
    pub fn advance(&mut self) -> bool {
        if self.is_final() {
            return false;
        }
        self.active += 1;
        true
    }

    /// 完了済みステップ
    pub fn completed(&self) -> &'static [&'static str] {
        &LOG_STEPS[..self.active]
    }
}

/// ステップ間隔を計算
///
/// # Arguments
/// * `sample` - [0, 1) の一様乱数
/// * `unit` - 1時間単位の長さ（本番は1秒）
pub fn step_delay(sample: f64, unit: Duration) -> Duration {
    let sample = sample.clamp(0.0, 1.0);
    let units = MIN_STEP_DELAY_UNITS + (MAX_STEP_DELAY_UNITS - MIN_STEP_DELAY_UNITS) * sample;
    unit.mul_f64(units)
}
