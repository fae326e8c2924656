//! Plate Triage Common Library
//!
//! CLIと解析クライアントで共有される型とユーティリティ

pub mod types;
pub mod error;
pub mod prompts;
pub mod parser;
pub mod report;
pub mod progress;

pub use types::{
    CostAnalysis, EquipmentRecord, Recommendation, WarrantyStatus, is_valid_equipment_record,
};
pub use error::{Error, Result};
pub use prompts::{build_system_instruction, ANALYZE_USER_PROMPT, ANALYSIS_TEMPERATURE};
pub use parser::{extract_json_object, parse_equipment_response, strip_code_fences};
pub use report::{build_report, classify_urgency, format_money, TriageReport, Urgency};
pub use progress::{ProgressLog, LOG_STEPS};
