//! 画像取り込み
//!
//! 選択された画像ファイルを読み込み、プレビューハンドルと
//! 送信用のBase64エンコードを作る。1枚でも失敗したら全体を失敗にする。

mod preview;

pub use preview::{PreviewHandle, PreviewStore};

use crate::config::Config;
use crate::error::{Result, TriageError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ImageFormat;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// 送信用にエンコードした画像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub file_name: String,
    pub media_type: String,
    /// Base64（標準アルファベット、パディングあり）
    pub data: String,
}

/// 取り込み上限
#[derive(Debug, Clone, Copy)]
pub struct IntakeLimits {
    pub max_images: usize,
    pub max_image_bytes: u64,
}

impl From<&Config> for IntakeLimits {
    fn from(config: &Config) -> Self {
        Self {
            max_images: config.max_images,
            max_image_bytes: config.max_image_bytes,
        }
    }
}

impl Default for IntakeLimits {
    fn default() -> Self {
        IntakeLimits::from(&Config::default())
    }
}

/// 1回の選択結果（入力順）
#[derive(Debug)]
pub struct Selection {
    previews: Vec<PreviewHandle>,
    images: Vec<EncodedImage>,
}

impl Selection {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn previews(&self) -> &[PreviewHandle] {
        &self.previews
    }

    pub fn images(&self) -> &[EncodedImage] {
        &self.images
    }

    pub fn into_parts(self) -> (Vec<PreviewHandle>, Vec<EncodedImage>) {
        (self.previews, self.images)
    }
}

/// 拡張子から画像のメディアタイプを判定
pub fn media_type_for(path: &Path) -> Option<&'static str> {
    ImageFormat::from_path(path)
        .ok()
        .map(|format| format.to_mime_type())
        .filter(|mime| mime.starts_with("image/"))
}

/// 引数のパスを画像ファイル一覧に展開
///
/// ファイルは指定順のまま、フォルダは直下の画像をファイル名順で追加する。
pub fn expand_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }

        let mut found: Vec<PathBuf> = WalkDir::new(path)
            .max_depth(1)  // 直下のみ（再帰しない）
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file() && media_type_for(p).is_some())
            .collect();

        // ファイル名でソート
        found.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        debug!(folder = %path.display(), count = found.len(), "folder expanded");
        files.extend(found);
    }

    Ok(files)
}

/// 画像を選択する
///
/// # Arguments
/// * `store` - プレビュー置き場
/// * `files` - 画像ファイル（入力順を保持）
/// * `limits` - 枚数・サイズ上限
///
/// # Returns
/// * `Ok(None)` - 空の選択（何もしない）
/// * `Ok(Some(Selection))` - 全画像の読み込みに成功
/// * `Err` - 1枚でも不正・読み込み失敗（作成済みのプレビューは解放される）
pub fn select_images(
    store: &mut PreviewStore,
    files: &[PathBuf],
    limits: &IntakeLimits,
) -> Result<Option<Selection>> {
    if files.is_empty() {
        return Ok(None);
    }

    if files.len() > limits.max_images {
        return Err(TriageError::TooManyImages {
            count: files.len(),
            max: limits.max_images,
        });
    }

    // 先に全ファイルを読み込み、失敗があればプレビューを作らない
    let mut blobs = Vec::with_capacity(files.len());
    for path in files {
        blobs.push(read_image(path, limits)?);
    }

    let mut previews = Vec::with_capacity(blobs.len());
    let mut images = Vec::with_capacity(blobs.len());
    for (file_name, media_type, bytes) in blobs {
        previews.push(store.create(&file_name, media_type, &bytes)?);
        images.push(EncodedImage {
            file_name,
            media_type: media_type.to_string(),
            data: STANDARD.encode(&bytes),
        });
    }

    info!(count = images.len(), "images selected");
    Ok(Some(Selection { previews, images }))
}

fn read_image(path: &Path, limits: &IntakeLimits) -> Result<(String, &'static str, Vec<u8>)> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let media_type = media_type_for(path).ok_or_else(|| TriageError::NotAnImage(file_name.clone()))?;

    let image_read = |source: std::io::Error| TriageError::ImageRead {
        path: path.to_path_buf(),
        source,
    };

    let size = std::fs::metadata(path).map_err(image_read)?.len();
    if size > limits.max_image_bytes {
        return Err(TriageError::ImageTooLarge {
            name: file_name,
            size,
            max: limits.max_image_bytes,
        });
    }

    let bytes = std::fs::read(path).map_err(image_read)?;
    Ok((file_name, media_type, bytes))
}
