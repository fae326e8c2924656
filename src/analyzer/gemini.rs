//! Gemini API連携
//!
//! 画像パーツ + 固定指示を generateContent に送り、
//! 応答テキストをEquipmentRecordへパースする

use super::{parse_analysis_response, AnalysisError, Analyzer};
use crate::config::Config;
use crate::error::{Result, TriageError};
use crate::intake::EncodedImage;
use plate_triage_common::{build_system_instruction, EquipmentRecord, ANALYZE_USER_PROMPT};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Gemini APIリクエスト
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    tools: Vec<Tool>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

/// Gemini APIレスポンス
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Gemini generateContent クライアント
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    temperature: f32,
    system_instruction: String,
}

impl GeminiClient {
    /// 設定と環境変数からクライアントを作成
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.get_api_key()?;
        Self::new(config, api_key)
    }

    pub fn new(config: &Config, api_key: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| TriageError::Config(format!("HTTPクライアント作成エラー: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            endpoint: endpoint_url(&config.api_base_url, &config.model),
            temperature: config.temperature,
            system_instruction: build_system_instruction(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_request(&self, images: &[EncodedImage]) -> GeminiRequest {
        // 画像パーツを先に、指示テキストを最後に置く
        let mut parts: Vec<Part> = images
            .iter()
            .map(|img| Part::InlineData {
                inline_data: InlineData {
                    mime_type: img.media_type.clone(),
                    data: img.data.clone(),
                },
            })
            .collect();
        parts.push(Part::Text {
            text: ANALYZE_USER_PROMPT.to_string(),
        });

        GeminiRequest {
            system_instruction: Content {
                parts: vec![Part::Text {
                    text: self.system_instruction.clone(),
                }],
            },
            contents: vec![Content { parts }],
            tools: vec![Tool {
                google_search: GoogleSearch {},
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        }
    }

    /// Gemini API呼び出し（1回のみ）
    async fn call_gemini_api(&self, request: &GeminiRequest) -> std::result::Result<String, AnalysisError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalysisError::Unavailable(format!("request timed out: {}", e))
                } else {
                    AnalysisError::Unavailable(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(%status, %body, "gemini error body");
            return Err(AnalysisError::Unavailable(format!("API error: {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::Unavailable(format!("failed to read response: {}", e)))?;

        extract_response_text(&body)
    }
}

impl Analyzer for GeminiClient {
    async fn analyze(&self, images: &[EncodedImage]) -> std::result::Result<EquipmentRecord, AnalysisError> {
        let request = self.build_request(images);
        info!(images = images.len(), endpoint = %self.endpoint, "sending analysis request");

        let text = self.call_gemini_api(&request).await?;
        debug!(chars = text.len(), "analysis response received");

        parse_analysis_response(&text)
    }
}

fn endpoint_url(base_url: &str, model: &str) -> String {
    format!("{}/models/{}:generateContent", base_url.trim_end_matches('/'), model)
}

/// レスポンス本文から候補テキストを取り出す
///
/// グラウンディング時は複数パーツに分かれるため連結する
fn extract_response_text(body: &str) -> std::result::Result<String, AnalysisError> {
    let malformed = |reason: String| AnalysisError::Malformed {
        reason,
        raw: body.to_string(),
    };

    let response: GeminiResponse = serde_json::from_str(body)
        .map_err(|e| malformed(format!("invalid response envelope: {}", e)))?;

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect::<String>())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(malformed("empty response".into()));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::AnalysisErrorKind;

    fn client() -> GeminiClient {
        GeminiClient::new(&Config::default(), "test-key".into()).unwrap()
    }

    fn image(name: &str, mime: &str, data: &str) -> EncodedImage {
        EncodedImage {
            file_name: name.into(),
            media_type: mime.into(),
            data: data.into(),
        }
    }

    #[test]
    fn test_endpoint_url() {
        assert_eq!(
            endpoint_url("https://generativelanguage.googleapis.com/v1beta/", "gemini-2.5-flash"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert!(client().endpoint().ends_with("gemini-2.5-flash:generateContent"));
    }

    #[test]
    fn test_request_body_shape() {
        let images = vec![
            image("model.jpg", "image/jpeg", "AAAA"),
            image("serial.png", "image/png", "BBBB"),
        ];
        let request = client().build_request(&images);
        let body = serde_json::to_value(&request).unwrap();

        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[0]["inlineData"]["data"], "AAAA");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[2]["text"], ANALYZE_USER_PROMPT);

        assert!(body["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Triage"));
        assert!(body["tools"][0]["googleSearch"].is_object());
        let temperature = body["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_request_never_contains_api_key() {
        let request = client().build_request(&[image("a.jpg", "image/jpeg", "AAAA")]);
        let body = serde_json::to_string(&request).unwrap();
        assert!(!body.contains("test-key"));
    }

    #[test]
    fn test_extract_concatenates_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"{\"brand\":"},{"text":"\"Lennox\"}"}]}}]}"#;
        assert_eq!(extract_response_text(body).unwrap(), r#"{"brand":"Lennox"}"#);
    }

    #[test]
    fn test_extract_missing_candidates() {
        let err = extract_response_text(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap_err();
        assert_eq!(err.kind(), AnalysisErrorKind::Malformed);
    }

    #[test]
    fn test_extract_invalid_envelope_keeps_raw() {
        let err = extract_response_text("<html>oops</html>").unwrap_err();
        match err {
            AnalysisError::Malformed { raw, .. } => assert_eq!(raw, "<html>oops</html>"),
            other => panic!("Expected Malformed error, got {:?}", other),
        }
    }
}
