use std::path::PathBuf;
use thiserror::Error;

use crate::analyzer::AnalysisError;

#[derive(Error, Debug)]
pub enum TriageError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`plate-triage config --set-api-key YOUR_KEY` または環境変数 GEMINI_API_KEY で設定してください")]
    MissingApiKey,

    #[error("画像読み込みエラー: {}: {source}", path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("画像ファイルではありません: {0}")]
    NotAnImage(String),

    #[error("画像が多すぎます: {count}枚（上限 {max}枚）")]
    TooManyImages { count: usize, max: usize },

    #[error("画像サイズが上限を超えています: {name} ({size} bytes, 上限 {max} bytes)")]
    ImageTooLarge { name: String, size: u64, max: u64 },

    #[error("解析中のため新しい画像は受け付けられません")]
    AnalysisInFlight,

    #[error("状態遷移エラー: {0}")]
    InvalidTransition(String),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("レコード検証エラー: {0}")]
    Common(#[from] plate_triage_common::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF生成エラー: {0}")]
    PdfGeneration(String),
}

pub type Result<T> = std::result::Result<T, TriageError>;
