use crate::error::{Result, TriageError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// APIキーを読む環境変数（先頭が優先）
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base_url: String,
    pub timeout_seconds: u64,
    pub max_images: usize,
    pub max_image_bytes: u64,
    pub temperature: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash".into(),
            api_base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            timeout_seconds: 120,
            max_images: 10,
            max_image_bytes: 20 * 1024 * 1024,
            temperature: plate_triage_common::ANALYSIS_TEMPERATURE,
        }
    }
}

// APIキーはログやデバッグ出力に出さない
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("max_images", &self.max_images)
            .field("max_image_bytes", &self.max_image_bytes)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| TriageError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("plate-triage").join("config.json"))
    }

    /// APIキーを取得（環境変数を優先）
    pub fn get_api_key(&self) -> Result<String> {
        let from_env = API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|key| !key.trim().is_empty());

        resolve_api_key(from_env, self.api_key.as_deref())
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn resolve_api_key(from_env: Option<String>, from_file: Option<&str>) -> Result<String> {
    if let Some(key) = from_env {
        return Ok(key);
    }

    from_file
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .ok_or(TriageError::MissingApiKey)
}
