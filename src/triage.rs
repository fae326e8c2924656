//! 解析パイプライン
//!
//! 選択 → Analyzing遷移 → 解析クライアント呼び出し（タイムアウト付き）と
//! アクティビティログを並行実行 → Complete | Error へ遷移。

use crate::analyzer::{AnalysisError, Analyzer};
use crate::error::Result;
use crate::intake::{EncodedImage, Selection};
use crate::progress::{PresenterConfig, ProgressPresenter};
use crate::session::{Resolution, Session, SessionStatus};
use plate_triage_common::EquipmentRecord;
use std::time::Duration;
use tracing::debug;

pub struct TriageRunner<A> {
    analyzer: A,
    timeout: Duration,
    presenter: PresenterConfig,
}

impl<A: Analyzer> TriageRunner<A> {
    pub fn new(analyzer: A, timeout: Duration) -> Self {
        Self {
            analyzer,
            timeout,
            presenter: PresenterConfig::default(),
        }
    }

    pub fn with_presenter(mut self, presenter: PresenterConfig) -> Self {
        self.presenter = presenter;
        self
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    /// 1サイクル実行する
    ///
    /// 実行中は`session`を排他借用するため、CLIからは途中でリセットできない。
    /// 放棄された応答の破棄は`Session::resolve`の世代チェックが担い、
    /// ここでは常にApplied側に到達する。
    ///
    /// # Returns
    /// * `Ok(SessionStatus)` - 遷移後の状態（Complete または Error）
    /// * `Err` - セッションが選択を受け付けなかった（状態は変わらない）
    pub async fn run(&self, session: &mut Session, selection: Selection) -> Result<SessionStatus> {
        let (ticket, images) = session.begin(selection)?;

        let presenter = ProgressPresenter::start(&self.presenter);
        let outcome = self.analyze_with_timeout(&images).await;
        presenter.stop();

        if let Err(e) = &outcome {
            e.log();
        }

        match session.resolve(ticket, outcome) {
            Resolution::Applied(status) => Ok(status),
            Resolution::Stale => {
                debug!(generation = ticket.generation(), "analysis result discarded");
                Ok(session.status())
            }
        }
    }

    async fn analyze_with_timeout(
        &self,
        images: &[EncodedImage],
    ) -> std::result::Result<EquipmentRecord, AnalysisError> {
        match tokio::time::timeout(self.timeout, self.analyzer.analyze(images)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(AnalysisError::Unavailable(format!(
                "analysis timed out after {}s",
                self.timeout.as_secs_f32()
            ))),
        }
    }
}
