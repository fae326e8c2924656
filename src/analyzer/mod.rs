//! 解析クライアント
//!
//! 外部の解析サービスを `Analyzer` トレイトの裏に隠す。
//! 1回の呼び出しにつき外部呼び出しは1回だけ（リトライ・キャッシュなし）。

mod gemini;

pub use gemini::GeminiClient;

use crate::intake::EncodedImage;
use plate_triage_common::{parse_equipment_response, EquipmentRecord};
use std::future::Future;
use thiserror::Error;
use tracing::{debug, warn};

/// ユーザーに見せる唯一のエラーメッセージ
pub const USER_ERROR_MESSAGE: &str =
    "Failed to analyze image. Ensure the data plate text is visible.";

/// 解析失敗の分類
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// 通信失敗・タイムアウト・非成功ステータス
    #[error("analysis service unavailable: {0}")]
    Unavailable(String),

    /// 応答はあったがEquipmentRecordにできない（rawは診断ログ専用）
    #[error("malformed analysis response: {reason}")]
    Malformed { reason: String, raw: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisErrorKind {
    Unavailable,
    Malformed,
}

impl AnalysisError {
    pub fn kind(&self) -> AnalysisErrorKind {
        match self {
            AnalysisError::Unavailable(_) => AnalysisErrorKind::Unavailable,
            AnalysisError::Malformed { .. } => AnalysisErrorKind::Malformed,
        }
    }

    /// どちらの分類でも同じ汎用メッセージ
    pub fn user_message(&self) -> &'static str {
        USER_ERROR_MESSAGE
    }

    /// 診断ログを出力（生テキストはdebugレベルのみ）
    pub fn log(&self) {
        match self {
            AnalysisError::Unavailable(detail) => {
                warn!(kind = "unavailable", %detail, "analysis failed");
            }
            AnalysisError::Malformed { reason, raw } => {
                warn!(kind = "malformed", %reason, raw_len = raw.len(), "analysis failed");
                debug!(raw = %raw, "raw analysis response");
            }
        }
    }
}

/// 画像を解析してEquipmentRecordを返す外部協調者
pub trait Analyzer {
    fn analyze(
        &self,
        images: &[EncodedImage],
    ) -> impl Future<Output = Result<EquipmentRecord, AnalysisError>> + Send;
}

/// 応答テキストをパース（共通パーサーをラップ）
///
/// 失敗時は生テキストをMalformedに保持する
pub fn parse_analysis_response(raw: &str) -> Result<EquipmentRecord, AnalysisError> {
    parse_equipment_response(raw).map_err(|e| AnalysisError::Malformed {
        reason: e.to_string(),
        raw: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARRIER_JSON: &str = r#"{"brand":"Carrier","modelNumber":"25HCB448A003","serialNumber":"2411A12345","manufactureDate":"November 2024","ageYears":1,"warrantyStatus":"Active","warrantyNotes":"10-year parts warranty active until 2034","manualUrl":"https://example.com/manual.pdf","recommendation":"Repair","recommendationReason":"Unit is new and under warranty","costAnalysis":{"estimatedRepairCost":650,"replacementOpportunity":9500,"savedTruckRollCost":150}}"#;

    #[test]
    fn test_parse_fenced_response() {
        let raw = format!("```json\n{}\n```", CARRIER_JSON);
        let record = parse_analysis_response(&raw).unwrap();
        assert_eq!(record.brand, "Carrier");
        assert_eq!(record.cost_analysis.saved_truck_roll_cost, 150.0);
    }

    #[test]
    fn test_parse_non_json_keeps_raw() {
        let raw = "Sorry, I could not read the plate.";
        let err = parse_analysis_response(raw).unwrap_err();
        assert_eq!(err.kind(), AnalysisErrorKind::Malformed);
        match err {
            AnalysisError::Malformed { raw: kept, .. } => assert_eq!(kept, raw),
            other => panic!("Expected Malformed error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_commentary_wrapped_is_malformed() {
        let raw = format!(
            "Sure! Here is the analysis you asked for:\n{}\nLet me know if you need anything else.",
            CARRIER_JSON
        );
        let err = parse_analysis_response(&raw).unwrap_err();
        assert_eq!(err.kind(), AnalysisErrorKind::Malformed);
        match err {
            AnalysisError::Malformed { raw: kept, .. } => assert_eq!(kept, raw),
            other => panic!("Expected Malformed error, got {:?}", other),
        }
    }

    #[test]
    fn test_user_message_is_generic() {
        let unavailable = AnalysisError::Unavailable("connection refused".into());
        let malformed = AnalysisError::Malformed {
            reason: "JSON object not found".into(),
            raw: "secret raw text".into(),
        };
        assert_eq!(unavailable.user_message(), USER_ERROR_MESSAGE);
        assert_eq!(malformed.user_message(), USER_ERROR_MESSAGE);
        assert!(!format!("{}", malformed).contains("secret raw text"));
    }
}
