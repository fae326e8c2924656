//! セッション状態機械
//!
//! Idle → Analyzing → Complete | Error の遷移を1つの状態値で管理する。
//! 各リクエストに世代番号を付け、リセット後に届いた古い応答は捨てる。

use crate::analyzer::AnalysisError;
use crate::error::{Result, TriageError};
use crate::intake::{EncodedImage, PreviewHandle, Selection};
use plate_triage_common::EquipmentRecord;
use tracing::{debug, info, warn};

/// 表示用ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Analyzing,
    Complete,
    Error,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Analyzing => "analyzing",
            SessionStatus::Complete => "complete",
            SessionStatus::Error => "error",
        }
    }
}

// 状態ごとのペイロードを列挙子に持たせる
#[derive(Debug)]
enum SessionState {
    Idle,
    Analyzing {
        previews: Vec<PreviewHandle>,
    },
    Complete {
        previews: Vec<PreviewHandle>,
        record: EquipmentRecord,
    },
    Error {
        previews: Vec<PreviewHandle>,
        failure: AnalysisError,
    },
}

/// 解析リクエストの世代タグ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// 応答適用の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied(SessionStatus),
    /// 世代不一致のため破棄
    Stale,
}

#[derive(Debug)]
pub struct Session {
    state: SessionState,
    generation: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            generation: 0,
        }
    }

    pub fn status(&self) -> SessionStatus {
        match self.state {
            SessionState::Idle => SessionStatus::Idle,
            SessionState::Analyzing { .. } => SessionStatus::Analyzing,
            SessionState::Complete { .. } => SessionStatus::Complete,
            SessionState::Error { .. } => SessionStatus::Error,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn previews(&self) -> &[PreviewHandle] {
        match &self.state {
            SessionState::Idle => &[],
            SessionState::Analyzing { previews }
            | SessionState::Complete { previews, .. }
            | SessionState::Error { previews, .. } => previews.as_slice(),
        }
    }

    /// Completeのときだけ結果を返す
    pub fn result(&self) -> Option<&EquipmentRecord> {
        match &self.state {
            SessionState::Complete { record, .. } => Some(record),
            _ => None,
        }
    }

    /// Errorのときだけユーザー向けメッセージを返す
    pub fn error_message(&self) -> Option<&'static str> {
        self.failure().map(AnalysisError::user_message)
    }

    /// Errorのときの失敗分類（ログ用）
    pub fn failure(&self) -> Option<&AnalysisError> {
        match &self.state {
            SessionState::Error { failure, .. } => Some(failure),
            _ => None,
        }
    }

    /// 画像選択イベント: Idle → Analyzing
    ///
    /// # Returns
    /// * `Ok((Ticket, images))` - 解析を開始した。imagesを解析クライアントへ渡す
    /// * `Err(AnalysisInFlight)` - 解析中の再選択（状態は変えない）
    /// * `Err(InvalidTransition)` - Complete/Errorからはリセットが先
    pub fn begin(&mut self, selection: Selection) -> Result<(Ticket, Vec<EncodedImage>)> {
        match self.state {
            SessionState::Idle => {}
            SessionState::Analyzing { .. } => {
                warn!(generation = self.generation, "selection rejected: analysis in flight");
                return Err(TriageError::AnalysisInFlight);
            }
            SessionState::Complete { .. } | SessionState::Error { .. } => {
                return Err(TriageError::InvalidTransition(format!(
                    "cannot select images while {}; reset first",
                    self.status().as_str()
                )));
            }
        }

        let (previews, images) = selection.into_parts();
        self.generation += 1;
        self.state = SessionState::Analyzing { previews };
        info!(generation = self.generation, images = images.len(), "analysis started");

        Ok((Ticket { generation: self.generation }, images))
    }

    /// 解析結果を適用: Analyzing → Complete | Error
    ///
    /// 世代が一致しない応答、Analyzing以外で届いた応答は捨てる
    pub fn resolve(
        &mut self,
        ticket: Ticket,
        outcome: std::result::Result<EquipmentRecord, AnalysisError>,
    ) -> Resolution {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "stale analysis response discarded"
            );
            return Resolution::Stale;
        }

        let previews = match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Analyzing { previews } => previews,
            other => {
                self.state = other;
                return Resolution::Stale;
            }
        };

        self.state = match outcome {
            Ok(record) => {
                info!(generation = self.generation, brand = %record.brand, "analysis complete");
                SessionState::Complete { previews, record }
            }
            Err(failure) => {
                // プレビューはエラー表示の背後に残す
                SessionState::Error { previews, failure }
            }
        };

        Resolution::Applied(self.status())
    }

    /// リセット: どの状態からでもIdleへ
    ///
    /// 結果・エラー・プレビューを破棄する（プレビューのローカルコピーも削除される）。
    /// 解析中だった場合、その応答は以後Staleになる。
    pub fn reset(&mut self) {
        let previous = self.status();
        self.state = SessionState::Idle;
        self.generation += 1;
        debug!(from = previous.as_str(), generation = self.generation, "session reset");
    }
}
