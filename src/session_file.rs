//! セッション保存ファイル
//!
//! スナップショットを設定ディレクトリの JSON ファイルに保存する。
//! 読めないファイルは保存なしとして扱う。

use pdi_sheet_common::session::{decode_snapshot, SessionSnapshot, SessionStore};
use pdi_sheet_common::STORAGE_KEY;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// ファイルに保存するセッションストア
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// 指定ディレクトリの `inspection-wizard-data.json`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(format!("{}.json", STORAGE_KEY)),
        }
    }

    /// 既定の保存先（`~/.config/pdi-sheet/`）
    pub fn default_location() -> crate::error::Result<Self> {
        Ok(Self::in_dir(&crate::config::Config::config_dir()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl SessionStore for FileStore {
    fn load(&self) -> Option<SessionSnapshot> {
        if !self.path.exists() {
            return None;
        }
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", self.path.display(), e);
                return None;
            }
        };
        decode_snapshot(&content)
    }

    fn save(&mut self, snapshot: &SessionSnapshot) -> pdi_sheet_common::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer(writer, snapshot)?;
        tracing::debug!("Saved session to {}", self.path.display());
        Ok(())
    }

    fn clear(&mut self) -> pdi_sheet_common::Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
