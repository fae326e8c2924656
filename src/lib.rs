//! 設備銘板トリアージ
//!
//! 銘板写真を解析サービスへ送り、修理/交換判定レポートを作る。

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod intake;
pub mod progress;
pub mod session;
pub mod triage;

pub use analyzer::{AnalysisError, Analyzer, GeminiClient};
pub use session::{Session, SessionStatus};
pub use triage::TriageRunner;
