//! APIレスポンスパーサー
//!
//! 解析サービスの応答テキストからコードフェンスを除去し、
//! JSONオブジェクトを抽出してEquipmentRecordへパースする

use crate::error::{Error, Result};
use crate::types::EquipmentRecord;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // ```json / ```JSON / ``` のいずれも除去対象
    static ref CODE_FENCE: Regex = Regex::new(r"```[A-Za-z]*").expect("valid fence regex");
}

/// コードフェンス記号を除去してトリムする
///
/// # Examples
/// ```
/// use plate_triage_common::strip_code_fences;
///
/// let text = "```json\n{\"brand\": \"Carrier\"}\n```";
/// assert_eq!(strip_code_fences(text), "{\"brand\": \"Carrier\"}");
/// ```
pub fn strip_code_fences(response: &str) -> String {
    CODE_FENCE.replace_all(response, "").trim().to_string()
}

/// フェンス除去後のテキストがJSONオブジェクトそのものであることを確認
///
/// 前後に説明文が付いた応答は受け付けない
pub fn extract_json_object(text: &str) -> Result<&str> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Ok(trimmed);
    }

    Err(Error::Parse("response is not a bare JSON object".into()))
}

/// 解析サービスの応答をパース
///
/// # Arguments
/// * `response` - 応答テキスト（コードフェンス付きでも可）
///
/// # Returns
/// * `Ok(EquipmentRecord)` - パースと検証に成功
/// * `Err` - JSONが見つからない、JSON不正、スキーマ不一致
pub fn parse_equipment_response(response: &str) -> Result<EquipmentRecord> {
    let stripped = strip_code_fences(response);
    let json_str = extract_json_object(&stripped)?;
    EquipmentRecord::from_json_str(json_str)
}
