//! 検査データの型定義
//!
//! CLIとWeb(WASM)で共有される型:
//! - HeaderField / HeaderInfo: シート上部のヘッダー項目
//! - InspectionItem: 検査項目1行分
//! - InspectionData: セッション全体の集約（ブック本体は含まない）

use crate::layout::CellRef;
use serde::{Deserialize, Serialize};

/// 検査項目の状態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Pending,
    Pass,
    Fail,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Pass => "pass",
            ItemStatus::Fail => "fail",
        }
    }

    /// 表示用ラベル
    pub fn label(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "Pending",
            ItemStatus::Pass => "Pass",
            ItemStatus::Fail => "Fail",
        }
    }
}

/// 総合判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Pass => "Pass",
            Verdict::Fail => "Fail",
        }
    }
}

/// ヘッダー項目（固定セル1つに対応）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderField {
    pub label: String,
    pub value: String,
    /// 読み込み元 = 書き戻し先。抽出後は変更しない
    pub cell_address: CellRef,
    #[serde(default)]
    pub is_required: bool,
}

/// ヘッダー項目から導出される値
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DerivedHeader {
    pub robot_model: String,
    pub serial_number: String,
    pub date: String,
}

/// ヘッダー情報
///
/// `derived` は `fields` から常に再計算できる。独立した値として編集しないこと。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderInfo {
    pub fields: Vec<HeaderField>,
    #[serde(flatten)]
    pub derived: DerivedHeader,
}

impl HeaderInfo {
    /// 項目リストから生成（導出値も計算）
    pub fn from_fields(fields: Vec<HeaderField>) -> Self {
        let derived = crate::mapper::derive_header(&fields);
        Self { fields, derived }
    }

    pub fn robot_model(&self) -> &str {
        &self.derived.robot_model
    }

    pub fn serial_number(&self) -> &str {
        &self.derived.serial_number
    }

    pub fn date(&self) -> &str {
        &self.derived.date
    }
}

/// 検査項目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionItem {
    /// 行番号から決まる安定ID（`item-10` など）
    pub id: String,
    /// 表示用の番号（行番号）
    pub item_number: String,
    pub description: String,
    #[serde(default)]
    pub status: ItemStatus,
    #[serde(default)]
    pub notes: String,
    /// 元シートの0始まり行。書き戻しは `row_index + 1` 行目
    pub row_index: u32,
}

impl InspectionItem {
    /// 1始まりの行番号から生成
    pub fn from_row(row: u32, description: String) -> Self {
        Self {
            id: format!("item-{}", row),
            item_number: row.to_string(),
            description,
            status: ItemStatus::Pending,
            notes: String::new(),
            row_index: row - 1,
        }
    }

    /// 書き戻し先の1始まり行番号
    pub fn sheet_row(&self) -> u32 {
        self.row_index.saturating_add(1)
    }
}

/// セッション全体の集約
///
/// 元ブックはシリアライズできないため、ここには含めず `Wizard` が別に保持する。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionData {
    pub header_info: HeaderInfo,
    pub items: Vec<InspectionItem>,
    #[serde(default)]
    pub current_item_index: usize,
    #[serde(default)]
    pub inspector_initials: String,
    #[serde(default, alias = "bonusQuestionAnswer")]
    pub verdict: Option<Verdict>,
}

impl InspectionData {
    /// 解析結果から初期状態を作る
    pub fn new(header_info: HeaderInfo, items: Vec<InspectionItem>) -> Self {
        Self {
            header_info,
            items,
            current_item_index: 0,
            inspector_initials: String::new(),
            verdict: None,
        }
    }

    pub fn current_item(&self) -> Option<&InspectionItem> {
        self.items.get(self.current_item_index)
    }

    /// 合否・未判定の集計
    pub fn summary(&self) -> InspectionSummary {
        let mut summary = InspectionSummary {
            total: self.items.len(),
            ..Default::default()
        };
        for item in &self.items {
            match item.status {
                ItemStatus::Pass => summary.passed += 1,
                ItemStatus::Fail => summary.failed += 1,
                ItemStatus::Pending => summary.pending += 1,
            }
        }
        summary
    }
}

/// レビュー画面の集計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InspectionSummary {
    pub passed: usize,
    pub failed: usize,
    pub pending: usize,
    pub total: usize,
}

/// ブック読み込み結果
#[derive(Debug)]
pub struct ExcelParseResult<W> {
    pub header_info: HeaderInfo,
    pub items: Vec<InspectionItem>,
    pub workbook: W,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(label: &str, address: &str, value: &str) -> HeaderField {
        HeaderField {
            label: label.to_string(),
            value: value.to_string(),
            cell_address: address.parse().unwrap(),
            is_required: false,
        }
    }

    #[test]
    fn test_item_from_row() {
        let item = InspectionItem::from_row(10, "Check cables".to_string());
        assert_eq!(item.id, "item-10");
        assert_eq!(item.item_number, "10");
        assert_eq!(item.row_index, 9);
        assert_eq!(item.sheet_row(), 10);
        assert_eq!(item.status, ItemStatus::Pending);
        assert!(item.notes.is_empty());
    }

    /// 保存データの行番号が壊れていても溢れない
    #[test]
    fn test_sheet_row_saturates() {
        let mut item = InspectionItem::from_row(8, "Q".to_string());
        item.row_index = u32::MAX;
        assert_eq!(item.sheet_row(), u32::MAX);
    }

    #[test]
    fn test_summary_counts() {
        let mut data = InspectionData::new(
            HeaderInfo::default(),
            (8..12).map(|r| InspectionItem::from_row(r, format!("Q{r}"))).collect(),
        );
        data.items[0].status = ItemStatus::Pass;
        data.items[1].status = ItemStatus::Fail;
        data.items[2].status = ItemStatus::Pass;

        let summary = data.summary();
        assert_eq!(summary, InspectionSummary { passed: 2, failed: 1, pending: 1, total: 4 });
    }

    #[test]
    fn test_inspection_data_serialize() {
        let header = HeaderInfo::from_fields(vec![
            field("Serial Number", "B4", "SN001"),
            field("Model", "D3", "IRB 6700"),
        ]);
        let mut data = InspectionData::new(header, vec![InspectionItem::from_row(8, "Q".into())]);
        data.verdict = Some(Verdict::Pass);

        let json = serde_json::to_string(&data).expect("シリアライズ失敗");
        assert!(json.contains("\"headerInfo\""));
        assert!(json.contains("\"cellAddress\":\"B4\""));
        assert!(json.contains("\"robotModel\":\"IRB 6700\""));
        assert!(json.contains("\"serialNumber\":\"SN001\""));
        assert!(json.contains("\"currentItemIndex\":0"));
        assert!(json.contains("\"status\":\"pending\""));
        assert!(json.contains("\"verdict\":\"pass\""));
    }

    #[test]
    fn test_inspection_data_deserialize_legacy_answer_key() {
        let json = r#"{
            "headerInfo": { "fields": [] },
            "items": [],
            "bonusQuestionAnswer": "fail"
        }"#;
        let data: InspectionData = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(data.verdict, Some(Verdict::Fail));
        assert_eq!(data.current_item_index, 0);
        assert_eq!(data.inspector_initials, "");
    }
}
