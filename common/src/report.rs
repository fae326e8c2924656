//! レポート表示モデル
//!
//! EquipmentRecordから緊急度分類と読み取り専用のレポート構造を作る。
//! 端末表示・PDF出力の両方がこのモデルを描画する。

use crate::prompts::REPLACE_AGE_THRESHOLD;
use crate::types::{EquipmentRecord, WarrantyStatus};

/// 印刷用ヘッダーのタイトル
pub const REPORT_TITLE: &str = "Visual Triage Report";

/// 表示上の緊急度（装飾用。recommendationとは独立）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Urgent,
    Normal,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Urgent => "urgent",
            Urgency::Normal => "normal",
        }
    }
}

/// 緊急度を判定
///
/// 機齢が12年を超える、または保証切れならUrgent。
/// AIのrecommendationと食い違っても調整しない。
pub fn classify_urgency(record: &EquipmentRecord) -> Urgency {
    if record.age_years > REPLACE_AGE_THRESHOLD
        || record.warranty_status == WarrantyStatus::Expired
    {
        Urgency::Urgent
    } else {
        Urgency::Normal
    }
}

/// 金額を "$9,500" 形式に整形
pub fn format_money(amount: f64) -> String {
    let cents = (amount * 100.0).round() as u64;
    let dollars = cents / 100;
    let rest = cents % 100;

    let digits = dollars.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rest == 0 {
        format!("${}", grouped)
    } else {
        format!("${}.{:02}", grouped, rest)
    }
}

/// レポートの1行（ラベルと値）
#[derive(Debug, Clone, PartialEq)]
pub struct ReportField {
    pub label: &'static str,
    pub value: String,
}

/// レポートのセクション
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    pub title: &'static str,
    pub fields: Vec<ReportField>,
}

/// 描画前のトリアージレポート
#[derive(Debug, Clone, PartialEq)]
pub struct TriageReport {
    pub title: String,
    pub generated_on: String,
    pub urgency: Urgency,
    pub headline: String,
    pub reason: String,
    pub age_label: String,
    pub sections: Vec<ReportSection>,
    pub manual_url: Option<String>,
    pub truck_roll_note: String,
}

/// レポートを構築
///
/// # Arguments
/// * `record` - 解析結果
/// * `generated_on` - 印刷ヘッダーに出す生成日
pub fn build_report(record: &EquipmentRecord, generated_on: &str) -> TriageReport {
    let costs = &record.cost_analysis;

    let fact_sheet = ReportSection {
        title: "Asset Fact Sheet",
        fields: vec![
            field("Brand", &record.brand),
            field("Model #", &record.model_number),
            field("Serial #", &record.serial_number),
            field("Mfg. Date", &record.manufacture_date),
            ReportField {
                label: "Warranty",
                value: record.warranty_status.as_str().to_uppercase(),
            },
            field("Warranty Notes", &record.warranty_notes),
        ],
    };

    let impact = ReportSection {
        title: "Business Impact Analysis",
        fields: vec![
            ReportField {
                label: "Estimated Repair Cost",
                value: format_money(costs.estimated_repair_cost),
            },
            ReportField {
                label: "Opportunity Value",
                value: format_money(costs.replacement_opportunity),
            },
        ],
    };

    TriageReport {
        title: REPORT_TITLE.to_string(),
        generated_on: generated_on.to_string(),
        urgency: classify_urgency(record),
        headline: format!("{} RECOMMENDED", record.recommendation.as_str().to_uppercase()),
        reason: record.recommendation_reason.clone(),
        age_label: format!("{} Years", record.age_years),
        sections: vec![fact_sheet, impact],
        manual_url: record.manual_url.clone(),
        truck_roll_note: format!(
            "By identifying this {}-year-old unit immediately, you avoided a {} wasted truck roll.",
            record.age_years,
            format_money(costs.saved_truck_roll_cost)
        ),
    }
}

fn field(label: &'static str, value: &str) -> ReportField {
    let value = if value.trim().is_empty() { "-".to_string() } else { value.to_string() };
    ReportField { label, value }
}

impl TriageReport {
    /// プレーンテキストの行に展開（端末表示・PDFで共通）
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("{}  (Generated: {})", self.title, self.generated_on),
            String::new(),
            format!("{} | Equipment Age: {}", self.headline, self.age_label),
            self.reason.clone(),
        ];

        for section in &self.sections {
            lines.push(String::new());
            lines.push(section.title.to_uppercase());
            for f in &section.fields {
                lines.push(format!("  {:<22} {}", f.label, f.value));
            }
        }

        if let Some(url) = &self.manual_url {
            lines.push(String::new());
            lines.push(format!("Installation Manual: {}", url));
        }

        lines.push(String::new());
        lines.push(format!("\"{}\"", self.truck_roll_note));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CostAnalysis, Recommendation};

    fn record(age_years: u32, warranty_status: WarrantyStatus) -> EquipmentRecord {
        EquipmentRecord {
            brand: "Goodman".to_string(),
            model_number: "GSX140361".to_string(),
            serial_number: "1504123456".to_string(),
            manufacture_date: "April 2015".to_string(),
            age_years,
            warranty_status,
            warranty_notes: "10-year parts warranty".to_string(),
            manual_url: None,
            recommendation: Recommendation::Consult,
            recommendation_reason: "Mid-life unit".to_string(),
            cost_analysis: CostAnalysis {
                estimated_repair_cost: 1200.0,
                replacement_opportunity: 12500.0,
                saved_truck_roll_cost: 150.0,
            },
        }
    }

    #[test]
    fn test_urgency_age_boundary() {
        assert_eq!(classify_urgency(&record(12, WarrantyStatus::Active)), Urgency::Normal);
        assert_eq!(classify_urgency(&record(13, WarrantyStatus::Active)), Urgency::Urgent);
        assert_eq!(classify_urgency(&record(0, WarrantyStatus::Unknown)), Urgency::Normal);
    }

    #[test]
    fn test_urgency_expired_warranty() {
        assert_eq!(classify_urgency(&record(1, WarrantyStatus::Expired)), Urgency::Urgent);
        assert_eq!(classify_urgency(&record(12, WarrantyStatus::Unknown)), Urgency::Normal);
    }

    #[test]
    fn test_urgency_ignores_recommendation() {
        let mut r = record(20, WarrantyStatus::Active);
        r.recommendation = Recommendation::Repair;
        assert_eq!(classify_urgency(&r), Urgency::Urgent);
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0), "$0");
        assert_eq!(format_money(150.0), "$150");
        assert_eq!(format_money(9500.0), "$9,500");
        assert_eq!(format_money(1234567.0), "$1,234,567");
        assert_eq!(format_money(650.5), "$650.50");
    }

    #[test]
    fn test_build_report_fields() {
        let report = build_report(&record(10, WarrantyStatus::Expired), "2026-10-19");
        assert_eq!(report.headline, "CONSULT RECOMMENDED");
        assert_eq!(report.age_label, "10 Years");
        assert_eq!(report.urgency, Urgency::Urgent);
        assert_eq!(report.sections.len(), 2);
        assert_eq!(report.sections[0].fields[0].value, "Goodman");
        assert_eq!(report.sections[0].fields[4].value, "EXPIRED");
        assert_eq!(report.sections[1].fields[1].value, "$12,500");
        assert!(report.truck_roll_note.contains("10-year-old unit"));
        assert!(report.truck_roll_note.contains("$150"));
    }

    #[test]
    fn test_lines_include_manual_only_when_present() {
        let mut r = record(3, WarrantyStatus::Active);
        let lines = build_report(&r, "2026-10-19").lines();
        assert!(!lines.iter().any(|l| l.contains("Installation Manual")));

        r.manual_url = Some("https://example.com/manual.pdf".to_string());
        let lines = build_report(&r, "2026-10-19").lines();
        assert!(lines.iter().any(|l| l.contains("https://example.com/manual.pdf")));
        assert!(lines[0].contains("Visual Triage Report"));
    }

    #[test]
    fn test_empty_field_shows_dash() {
        let mut r = record(3, WarrantyStatus::Active);
        r.serial_number = String::new();
        let report = build_report(&r, "2026-10-19");
        assert_eq!(report.sections[0].fields[2].value, "-");
    }
}
