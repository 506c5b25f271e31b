//! 進行中セッションの保存
//!
//! 集約データと現在ステップだけをJSONで保存する。元ブックは含めない。
//! 保存先は `SessionStore` の実装（CLIはファイル、Webはブラウザのストレージ）。

use crate::error::Result;
use crate::types::InspectionData;
use crate::wizard::WizardStep;
use serde::{Deserialize, Serialize};

/// 保存キー
pub const STORAGE_KEY: &str = "inspection-wizard-data";

/// 保存されるスナップショット
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub data: InspectionData,
    pub step: WizardStep,
}

impl SessionSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// 保存文字列を読み込む
///
/// 壊れたデータは保存なしとして扱う。
pub fn decode_snapshot(raw: &str) -> Option<SessionSnapshot> {
    match serde_json::from_str(raw) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            tracing::warn!("Discarding unreadable session: {}", e);
            None
        }
    }
}

/// スナップショットの保存先
pub trait SessionStore {
    fn load(&self) -> Option<SessionSnapshot>;

    fn save(&mut self, snapshot: &SessionSnapshot) -> Result<()>;

    fn clear(&mut self) -> Result<()>;
}

/// メモリ上の保存先（テスト用）
#[derive(Debug, Default)]
pub struct MemoryStore {
    raw: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 生の文字列を直接入れる
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self { raw: Some(raw.into()) }
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Option<SessionSnapshot> {
        self.raw.as_deref().and_then(decode_snapshot)
    }

    fn save(&mut self, snapshot: &SessionSnapshot) -> Result<()> {
        self.raw = Some(snapshot.to_json()?);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.raw = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HeaderInfo, InspectionItem, ItemStatus, Verdict};

    fn snapshot() -> SessionSnapshot {
        let mut items = vec![
            InspectionItem::from_row(8, "Check bolts".into()),
            InspectionItem::from_row(9, "Check cables".into()),
        ];
        items[0].status = ItemStatus::Fail;
        items[0].notes = "bolt missing".into();
        let mut data = InspectionData::new(HeaderInfo::default(), items);
        data.current_item_index = 1;
        data.verdict = Some(Verdict::Fail);
        SessionSnapshot { data, step: WizardStep::Inspection }
    }

    #[test]
    fn test_save_load_clear() {
        let mut store = MemoryStore::new();
        assert!(store.load().is_none());

        store.save(&snapshot()).unwrap();
        assert_eq!(store.load(), Some(snapshot()));

        store.clear().unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_json_shape() {
        let json: serde_json::Value = serde_json::from_str(&snapshot().to_json().unwrap()).unwrap();
        assert_eq!(json["step"], "inspection");
        assert_eq!(json["data"]["currentItemIndex"], 1);
        assert_eq!(json["data"]["items"][0]["status"], "fail");
        assert_eq!(json["data"]["items"][0]["rowIndex"], 7);
    }

    #[test]
    fn test_corrupt_data_is_ignored() {
        assert!(MemoryStore::with_raw("{not json").load().is_none());
        assert!(MemoryStore::with_raw(r#"{"step":"teleport","data":{}}"#).load().is_none());
    }
}
