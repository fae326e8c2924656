pub mod pdf;

use crate::error::Result;
use plate_triage_common::{build_report, EquipmentRecord, TriageReport};
use std::path::Path;

/// 印刷ヘッダー用の生成日
pub fn generated_on() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// レコードから当日付のレポートを作る
pub fn report_for(record: &EquipmentRecord) -> TriageReport {
    build_report(record, &generated_on())
}

/// 端末表示用テキスト
pub fn render_text(report: &TriageReport) -> String {
    let rule = "=".repeat(64);
    let mut out = String::new();
    out.push_str(&rule);
    out.push('\n');
    out.push_str(&format!("[{}]\n", report.urgency.as_str().to_uppercase()));
    for line in report.lines() {
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str(&rule);
    out.push('\n');
    out
}

/// 解析結果をJSONで保存
pub fn write_json(record: &EquipmentRecord, output: &Path) -> Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(record)?;
    std::fs::write(output, json)?;
    Ok(())
}

/// 保存済みJSONを読み込み、検証してレコードに戻す
pub fn load_record(input: &Path) -> Result<EquipmentRecord> {
    let content = std::fs::read_to_string(input)?;
    Ok(EquipmentRecord::from_json_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TriageError;
    use plate_triage_common::{CostAnalysis, Recommendation, Urgency, WarrantyStatus};
    use tempfile::tempdir;

    fn record() -> EquipmentRecord {
        EquipmentRecord {
            brand: "Bradford White".into(),
            model_number: "RG250T6N".into(),
            serial_number: "KL1234567".into(),
            manufacture_date: "November 2009".into(),
            age_years: 16,
            warranty_status: WarrantyStatus::Expired,
            warranty_notes: "6-year tank warranty expired in 2015".into(),
            manual_url: Some("https://example.com/rg2.pdf".into()),
            recommendation: Recommendation::Replace,
            recommendation_reason: "Past service life".into(),
            cost_analysis: CostAnalysis {
                estimated_repair_cost: 700.0,
                replacement_opportunity: 3800.0,
                saved_truck_roll_cost: 150.0,
            },
        }
    }

    #[test]
    fn test_render_text() {
        let report = build_report(&record(), "2026-10-19");
        assert_eq!(report.urgency, Urgency::Urgent);

        let text = render_text(&report);
        assert!(text.contains("[URGENT]"));
        assert!(text.contains("REPLACE RECOMMENDED"));
        assert!(text.contains("16 Years"));
        assert!(text.contains("$3,800"));
        assert!(text.contains("https://example.com/rg2.pdf"));
    }

    #[test]
    fn test_json_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("record.json");

        write_json(&record(), &path).unwrap();
        let loaded = load_record(&path).unwrap();
        assert_eq!(loaded, record());
    }

    #[test]
    fn test_load_invalid_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"brand": "Bradford White"}"#).unwrap();

        let err = load_record(&path).unwrap_err();
        assert!(matches!(err, TriageError::Common(_)));
    }
}
