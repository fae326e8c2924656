//! 解析結果の型定義
//!
//! CLIと外部連携で共有される型:
//! - EquipmentRecord: 1回の解析で得られる設備情報（最終出力）
//! - WarrantyStatus / Recommendation: 列挙フィールド
//! - CostAnalysis: 修理費・更新機会・出張費

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// 保証状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarrantyStatus {
    Active,
    Expired,
    Unknown,
}

impl WarrantyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarrantyStatus::Active => "Active",
            WarrantyStatus::Expired => "Expired",
            WarrantyStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for WarrantyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// トリアージ推奨（修理 / 交換 / 要相談）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Repair,
    Replace,
    Consult,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Repair => "Repair",
            Recommendation::Replace => "Replace",
            Recommendation::Consult => "Consult",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// コスト分析（通貨は暗黙のUSD）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostAnalysis {
    pub estimated_repair_cost: f64,
    pub replacement_opportunity: f64,
    pub saved_truck_roll_cost: f64,
}

/// 設備銘板の解析結果
///
/// 全フィールドが揃った正しい型の値としてのみ構築される。
/// 部分的なレスポンスから中途半端なレコードを作ることはない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentRecord {
    pub brand: String,
    pub model_number: String,
    pub serial_number: String,

    /// 製造年月（例: "February 2011"、正規化しない）
    pub manufacture_date: String,

    pub age_years: u32,
    pub warranty_status: WarrantyStatus,
    pub warranty_notes: String,

    /// マニュアルURL（見つからない場合はNone）
    #[serde(
        default,
        deserialize_with = "deserialize_optional_url",
        skip_serializing_if = "Option::is_none"
    )]
    pub manual_url: Option<String>,

    pub recommendation: Recommendation,
    pub recommendation_reason: String,
    pub cost_analysis: CostAnalysis,
}

impl EquipmentRecord {
    /// JSON値からレコードを構築し、検証する
    ///
    /// # Arguments
    /// * `value` - 解析サービスが返したJSONオブジェクト
    ///
    /// # Returns
    /// * `Ok(EquipmentRecord)` - 全フィールドが正しい型で揃っている場合
    /// * `Err` - 欠落・型不一致・列挙値不正・負の金額
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::Validation("expected a JSON object".into()));
        }
        let record: EquipmentRecord = serde_json::from_value(value)
            .map_err(|e| Error::Validation(e.to_string()))?;
        record.validate()?;
        Ok(record)
    }

    /// JSON文字列からレコードを構築し、検証する
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// 型だけでは表現できない制約を検証
    pub fn validate(&self) -> Result<()> {
        let costs = [
            ("estimatedRepairCost", self.cost_analysis.estimated_repair_cost),
            ("replacementOpportunity", self.cost_analysis.replacement_opportunity),
            ("savedTruckRollCost", self.cost_analysis.saved_truck_roll_cost),
        ];
        for (name, amount) in costs {
            if !amount.is_finite() || amount < 0.0 {
                return Err(Error::Validation(format!(
                    "costAnalysis.{} must be a non-negative amount, got {}",
                    name, amount
                )));
            }
        }
        Ok(())
    }
}

/// 有効なEquipmentRecordかどうかを判定する
pub fn is_valid_equipment_record(value: &serde_json::Value) -> bool {
    EquipmentRecord::from_value(value.clone()).is_ok()
}

// 空文字・"null" 文字列はURLなしとして扱う
fn deserialize_optional_url<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("null")))
}
