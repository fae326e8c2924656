//! プレビューハンドル
//!
//! 選択画像のローカルコピーをセッション用の一時ディレクトリに置く。
//! ハンドルをdropするとコピーは削除される。

use crate::error::Result;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::debug;

/// プレビュー置き場（ハンドルの発行と生存数の管理）
#[derive(Debug)]
pub struct PreviewStore {
    dir: TempDir,
    next_id: u64,
    live: Arc<AtomicUsize>,
}

impl PreviewStore {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("plate-triage-previews-")
            .tempdir()?;
        Ok(Self {
            dir,
            next_id: 0,
            live: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// 生存中のハンドル数
    pub fn live_count(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// 画像バイト列からプレビューハンドルを作成
    pub fn create(&mut self, file_name: &str, media_type: &str, bytes: &[u8]) -> Result<PreviewHandle> {
        let id = self.next_id;
        self.next_id += 1;

        let path = self.dir.path().join(format!("{:04}-{}", id, file_name));
        std::fs::write(&path, bytes)?;
        self.live.fetch_add(1, Ordering::SeqCst);
        debug!(id, path = %path.display(), "preview created");

        Ok(PreviewHandle {
            id,
            file_name: file_name.to_string(),
            media_type: media_type.to_string(),
            path,
            live: Arc::clone(&self.live),
        })
    }
}

/// 画面表示用のローカル画像参照（ネットワーク不要）
#[derive(Debug)]
pub struct PreviewHandle {
    id: u64,
    file_name: String,
    media_type: String,
    path: PathBuf,
    live: Arc<AtomicUsize>,
}

impl PreviewHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        // ストアが先に消えている場合はディレクトリごと削除済み
        let _ = std::fs::remove_file(&self.path);
        self.live.fetch_sub(1, Ordering::SeqCst);
        debug!(id = self.id, "preview released");
    }
}
