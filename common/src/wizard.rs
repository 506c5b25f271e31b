//! 検査ウィザードの状態機械
//!
//! ```text
//! upload → header → inspection → review → initials → bonus → generate
//! ```
//!
//! 戻る遷移は inspection 内の「前へ」と review からの「編集」だけ。
//! 各操作は自分のステップでしか受け付けない。
//!
//! 元ブック（`W`）はシリアライズ対象の `InspectionData` とは別に保持し、
//! 復元後は `attach_workbook` で付け直す。リセットで破棄する。

use crate::error::Error;
use crate::mapper::{derive_header, Workbook};
use crate::output::{generate_file, GeneratedFile};
use crate::session::SessionSnapshot;
use crate::types::{
    ExcelParseResult, HeaderInfo, InspectionData, InspectionItem, InspectionSummary, ItemStatus,
    Verdict,
};
use crate::validate::{
    normalize_initials, validate_failure_note, validate_header, FieldErrors, InitialsError,
    NoteError,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 一括不合格時の既定メモ
pub const DEFAULT_FAILURE_NOTE: &str = "Robot failed inspection";

/// ウィザードのステップ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    #[default]
    Upload,
    Header,
    Inspection,
    Review,
    Initials,
    Bonus,
    Generate,
}

impl WizardStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::Upload => "upload",
            WizardStep::Header => "header",
            WizardStep::Inspection => "inspection",
            WizardStep::Review => "review",
            WizardStep::Initials => "initials",
            WizardStep::Bonus => "bonus",
            WizardStep::Generate => "generate",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ウィザード操作のエラー
///
/// 入力チェック系（Header / Initials / Note）は状態を変えない。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("action belongs to the {expected} step but the wizard is at {actual}")]
    WrongStep {
        expected: WizardStep,
        actual: WizardStep,
    },

    #[error("no inspection in progress")]
    NoSession,

    #[error("no inspection item at the current position")]
    NoCurrentItem,

    #[error("unknown inspection item: {0}")]
    UnknownItem(String),

    #[error("{0}")]
    Header(FieldErrors),

    #[error("{0}")]
    Initials(#[from] InitialsError),

    #[error("{0}")]
    Note(#[from] NoteError),
}

/// 検査ウィザード
#[derive(Debug)]
pub struct Wizard<W> {
    step: WizardStep,
    data: Option<InspectionData>,
    workbook: Option<W>,
    /// 読み込み・生成失敗のメッセージ（画面表示用）
    error: Option<String>,
    completed: bool,
}

impl<W> Default for Wizard<W> {
    fn default() -> Self {
        Self {
            step: WizardStep::Upload,
            data: None,
            workbook: None,
            error: None,
            completed: false,
        }
    }
}

impl<W: Workbook> Wizard<W> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn data(&self) -> Option<&InspectionData> {
        self.data.as_ref()
    }

    pub fn has_workbook(&self) -> bool {
        self.workbook.is_some()
    }

    pub fn workbook(&self) -> Option<&W> {
        self.workbook.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// 生成が成功したか
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    fn expect_step(&self, expected: WizardStep) -> Result<(), WizardError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(WizardError::WrongStep { expected, actual: self.step })
        }
    }

    fn data_mut(&mut self) -> Result<&mut InspectionData, WizardError> {
        self.data.as_mut().ok_or(WizardError::NoSession)
    }

    // ============================================
    // upload
    // ============================================

    /// 読み込み結果を受け取る
    ///
    /// 成功時は集約をまとめて初期化して header へ。
    /// 失敗時はメッセージを記録して upload に留まる（状態は変更しない）。
    pub fn load(&mut self, parsed: crate::error::Result<ExcelParseResult<W>>) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Upload)?;
        match parsed {
            Ok(result) => {
                tracing::info!(
                    "Loaded template: {} header fields, {} items",
                    result.header_info.fields.len(),
                    result.items.len()
                );
                self.data = Some(InspectionData::new(result.header_info, result.items));
                self.workbook = Some(result.workbook);
                self.error = None;
                self.completed = false;
                self.step = WizardStep::Header;
            }
            Err(e) => {
                tracing::warn!("Failed to parse template: {}", e);
                self.error = Some(e.to_string());
            }
        }
        Ok(())
    }

    /// 復元後に元ブックを付け直す（収集済みデータは変更しない）
    pub fn attach_workbook(&mut self, workbook: W) -> Result<(), WizardError> {
        if self.data.is_none() {
            return Err(WizardError::NoSession);
        }
        self.workbook = Some(workbook);
        self.error = None;
        Ok(())
    }

    // ============================================
    // header
    // ============================================

    /// ヘッダー値を確定して inspection へ
    ///
    /// `values` は項目順。足りない分は現在値のまま。
    pub fn submit_header(&mut self, values: &[String]) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Header)?;
        let data = self.data_mut()?;

        let mut fields = data.header_info.fields.clone();
        for (field, value) in fields.iter_mut().zip(values) {
            field.value = value.clone();
        }
        validate_header(&fields).map_err(WizardError::Header)?;

        let derived = derive_header(&fields);
        data.header_info = HeaderInfo { fields, derived };
        self.step = WizardStep::Inspection;
        Ok(())
    }

    // ============================================
    // inspection
    // ============================================

    pub fn current_item(&self) -> Option<&InspectionItem> {
        self.data.as_ref().and_then(|d| d.current_item())
    }

    /// 進捗 (現在位置+1, 全件数)
    pub fn progress(&self) -> (usize, usize) {
        match &self.data {
            Some(data) => (data.current_item_index + 1, data.items.len()),
            None => (0, 0),
        }
    }

    /// 現在の項目を合格にして次へ
    pub fn pass(&mut self) -> Result<(), WizardError> {
        self.mark_current(ItemStatus::Pass, String::new())
    }

    /// 現在の項目を不合格にして次へ（メモ必須）
    pub fn fail(&mut self, note: &str) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Inspection)?;
        let note = validate_failure_note(note)?;
        self.mark_current(ItemStatus::Fail, note)
    }

    fn mark_current(&mut self, status: ItemStatus, notes: String) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Inspection)?;
        let data = self.data_mut()?;
        let index = data.current_item_index;
        let item = data.items.get_mut(index).ok_or(WizardError::NoCurrentItem)?;
        item.status = status;
        item.notes = notes;

        if index + 1 < data.items.len() {
            data.current_item_index = index + 1;
        } else {
            self.step = WizardStep::Review;
        }
        Ok(())
    }

    /// 現在位置以降の未判定項目をすべて不合格にして review へ
    ///
    /// 既存メモは残す。現在位置より前の判定は変更しない。
    pub fn fully_fail(&mut self) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Inspection)?;
        let data = self.data_mut()?;
        let start = data.current_item_index;
        for item in data.items.iter_mut().skip(start) {
            if item.status != ItemStatus::Pending {
                continue;
            }
            item.status = ItemStatus::Fail;
            if item.notes.is_empty() {
                item.notes = DEFAULT_FAILURE_NOTE.to_string();
            }
        }
        self.step = WizardStep::Review;
        Ok(())
    }

    /// 前の項目へ（先頭では何もしない）
    pub fn previous(&mut self) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Inspection)?;
        let data = self.data_mut()?;
        data.current_item_index = data.current_item_index.saturating_sub(1);
        Ok(())
    }

    // ============================================
    // review
    // ============================================

    pub fn summary(&self) -> InspectionSummary {
        self.data.as_ref().map(|d| d.summary()).unwrap_or_default()
    }

    /// 指定項目から inspection をやり直す
    pub fn edit_item(&mut self, item_id: &str) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Review)?;
        let data = self.data_mut()?;
        let index = data
            .items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or_else(|| WizardError::UnknownItem(item_id.to_string()))?;
        data.current_item_index = index;
        self.step = WizardStep::Inspection;
        Ok(())
    }

    pub fn finish_review(&mut self) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Review)?;
        self.step = WizardStep::Initials;
        Ok(())
    }

    // ============================================
    // initials / bonus
    // ============================================

    /// イニシャルを確定して bonus へ
    pub fn submit_initials(&mut self, input: &str) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Initials)?;
        let initials = normalize_initials(input)?;
        self.data_mut()?.inspector_initials = initials;
        self.step = WizardStep::Bonus;
        Ok(())
    }

    /// 総合判定を選んで generate へ（再選択は上書き）
    pub fn choose_verdict(&mut self, verdict: Verdict) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Bonus)?;
        self.data_mut()?.verdict = Some(verdict);
        self.step = WizardStep::Generate;
        Ok(())
    }

    // ============================================
    // generate
    // ============================================

    /// 元ブックに書き戻してファイルを生成
    ///
    /// 失敗してもデータは保持し、エラーを記録する（再試行可能）。
    pub fn generate(&mut self) -> Result<GeneratedFile, GenerateError> {
        self.expect_step(WizardStep::Generate)?;
        let data = self.data.as_ref().ok_or(WizardError::NoSession)?;

        match generate_file(data, self.workbook.as_mut()) {
            Ok(file) => {
                self.error = None;
                self.completed = true;
                Ok(file)
            }
            Err(e) => {
                tracing::error!("Error generating Excel: {}", e);
                self.error = Some(e.to_string());
                Err(GenerateError::Output(e))
            }
        }
    }

    /// 生成完了後に新しい検査を開始（全状態を破棄して upload へ）
    pub fn start_new(&mut self) {
        self.reset();
    }

    /// 全状態を破棄して upload へ戻る
    ///
    /// 保存済みスナップショットの削除は呼び出し側が行う。
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // ============================================
    // スナップショット
    // ============================================

    /// 保存用スナップショット（ブックは含まない）
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.data.as_ref().map(|data| SessionSnapshot {
            data: data.clone(),
            step: self.step,
        })
    }

    /// スナップショットから復元（ブックは未接続）
    pub fn restore(snapshot: SessionSnapshot) -> Self {
        let SessionSnapshot { mut data, step } = snapshot;
        let last = data.items.len().saturating_sub(1);
        data.current_item_index = data.current_item_index.min(last);
        data.header_info.derived = derive_header(&data.header_info.fields);
        Self {
            step,
            data: Some(data),
            workbook: None,
            error: None,
            completed: false,
        }
    }
}

/// 生成操作のエラー
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error(transparent)]
    Output(#[from] Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::{parse_workbook, CellValue, Worksheet};
    use crate::memory::{MemorySheet, MemoryWorkbook};
    use crate::validate::REQUIRED_MESSAGE;
    use pretty_assertions::assert_eq;

    fn template(item_count: u32) -> MemoryWorkbook {
        let mut sheet = MemorySheet::new("PDI");
        sheet.put("B3", "ACME".into());
        sheet.put("B4", "SN:001".into());
        sheet.put("D3", "IRB/6700".into());
        for i in 0..item_count {
            sheet.put(&format!("B{}", 8 + i), CellValue::Text(format!("Question {}", i + 1)));
        }
        MemoryWorkbook::with_sheet(sheet)
    }

    fn loaded(item_count: u32) -> Wizard<MemoryWorkbook> {
        let mut wizard = Wizard::new();
        wizard.load(parse_workbook(template(item_count))).unwrap();
        wizard
    }

    fn at_inspection(item_count: u32) -> Wizard<MemoryWorkbook> {
        let mut wizard = loaded(item_count);
        let values: Vec<String> = wizard
            .data()
            .unwrap()
            .header_info
            .fields
            .iter()
            .map(|f| f.value.clone())
            .collect();
        wizard.submit_header(&values).unwrap();
        wizard
    }

    fn items(wizard: &Wizard<MemoryWorkbook>) -> &[InspectionItem] {
        &wizard.data().unwrap().items
    }

    #[test]
    fn test_load_initializes_session() {
        let wizard = loaded(3);
        assert_eq!(wizard.step(), WizardStep::Header);
        assert!(wizard.has_workbook());
        let data = wizard.data().unwrap();
        assert_eq!(data.items.len(), 3);
        assert_eq!(data.current_item_index, 0);
        assert_eq!(data.inspector_initials, "");
        assert_eq!(data.verdict, None);
    }

    #[test]
    fn test_load_failure_stays_on_upload() {
        let mut wizard: Wizard<MemoryWorkbook> = Wizard::new();
        wizard.load(Err(Error::Workbook("not a zip".into()))).unwrap();
        assert_eq!(wizard.step(), WizardStep::Upload);
        assert!(wizard.data().is_none());
        assert_eq!(wizard.error(), Some("Failed to read workbook: not a zip"));

        wizard.load(parse_workbook(template(1))).unwrap();
        assert_eq!(wizard.step(), WizardStep::Header);
        assert_eq!(wizard.error(), None);
    }

    #[test]
    fn test_actions_rejected_outside_their_step() {
        let mut wizard = loaded(2);
        assert_eq!(
            wizard.pass(),
            Err(WizardError::WrongStep { expected: WizardStep::Inspection, actual: WizardStep::Header })
        );
        assert!(wizard.finish_review().is_err());
        assert!(wizard.submit_initials("JD").is_err());
        assert!(wizard.choose_verdict(Verdict::Pass).is_err());
        assert!(matches!(wizard.generate(), Err(GenerateError::Wizard(_))));
        assert_eq!(wizard.step(), WizardStep::Header);
    }

    #[test]
    fn test_header_requires_required_fields() {
        let mut wizard = loaded(2);
        let mut values: Vec<String> = vec![String::new(); 8];
        values[1] = "SN1".into();

        let err = wizard.submit_header(&values).unwrap_err();
        let WizardError::Header(errors) = err else { panic!("expected header errors") };
        assert_eq!(errors.get("Customer Name"), Some(REQUIRED_MESSAGE));
        assert_eq!(errors.get("Model"), Some(REQUIRED_MESSAGE));
        assert_eq!(errors.get("Serial Number"), None);

        // 失敗時は状態を変更しない
        assert_eq!(wizard.step(), WizardStep::Header);
        assert_eq!(wizard.data().unwrap().header_info.fields[0].value, "ACME");
    }

    #[test]
    fn test_header_recomputes_derived_values() {
        let mut wizard = loaded(2);
        let mut values: Vec<String> = wizard
            .data()
            .unwrap()
            .header_info
            .fields
            .iter()
            .map(|f| f.value.clone())
            .collect();
        values[4] = "IRB 1200".into();
        values[7] = "2025-05-01".into();

        wizard.submit_header(&values).unwrap();

        let header = &wizard.data().unwrap().header_info;
        assert_eq!(wizard.step(), WizardStep::Inspection);
        assert_eq!(header.robot_model(), "IRB 1200");
        assert_eq!(header.serial_number(), "SN:001");
        assert_eq!(header.date(), "2025-05-01");
        assert_eq!(header.fields[4].cell_address.to_string(), "D3");
    }

    #[test]
    fn test_pass_and_fail_advance_cursor() {
        let mut wizard = at_inspection(3);
        assert_eq!(wizard.progress(), (1, 3));

        wizard.pass().unwrap();
        assert_eq!(wizard.progress(), (2, 3));
        wizard.fail("  bracket loose ").unwrap();
        assert_eq!(wizard.progress(), (3, 3));

        assert_eq!(items(&wizard)[0].status, ItemStatus::Pass);
        assert_eq!(items(&wizard)[1].status, ItemStatus::Fail);
        assert_eq!(items(&wizard)[1].notes, "bracket loose");
        assert_eq!(wizard.step(), WizardStep::Inspection);
    }

    #[test]
    fn test_fail_requires_note() {
        let mut wizard = at_inspection(2);
        assert_eq!(wizard.fail("   "), Err(WizardError::Note(NoteError::Empty)));
        assert_eq!(items(&wizard)[0].status, ItemStatus::Pending);
        assert_eq!(wizard.progress(), (1, 2));
    }

    #[test]
    fn test_pass_clears_notes() {
        let mut wizard = at_inspection(2);
        wizard.fail("scratch").unwrap();
        wizard.previous().unwrap();
        wizard.pass().unwrap();
        assert_eq!(items(&wizard)[0].status, ItemStatus::Pass);
        assert_eq!(items(&wizard)[0].notes, "");
    }

    #[test]
    fn test_last_item_moves_to_review() {
        let mut wizard = at_inspection(2);
        wizard.pass().unwrap();
        wizard.pass().unwrap();
        assert_eq!(wizard.step(), WizardStep::Review);
        assert_eq!(wizard.data().unwrap().current_item_index, 1);
    }

    #[test]
    fn test_previous_at_start_is_noop() {
        let mut wizard = at_inspection(3);
        wizard.previous().unwrap();
        assert_eq!(wizard.progress(), (1, 3));

        wizard.pass().unwrap();
        wizard.previous().unwrap();
        assert_eq!(wizard.progress(), (1, 3));
        assert_eq!(items(&wizard)[0].status, ItemStatus::Pass);
    }

    #[test]
    fn test_fully_fail_from_cursor() {
        let mut wizard = at_inspection(10);
        {
            let data = wizard.data.as_mut().unwrap();
            data.items[2].status = ItemStatus::Pass;
            data.items[7].status = ItemStatus::Fail;
            data.items[7].notes = "custom note".into();
            data.items[6].notes = "left from earlier".into();
            data.current_item_index = 5;
        }

        wizard.fully_fail().unwrap();

        assert_eq!(wizard.step(), WizardStep::Review);
        let items = items(&wizard);
        for i in [0, 1, 3, 4] {
            assert_eq!(items[i].status, ItemStatus::Pending, "item {i}");
        }
        assert_eq!(items[2].status, ItemStatus::Pass);
        for i in [5, 8, 9] {
            assert_eq!(items[i].status, ItemStatus::Fail);
            assert_eq!(items[i].notes, DEFAULT_FAILURE_NOTE);
        }
        assert_eq!(items[6].status, ItemStatus::Fail);
        assert_eq!(items[6].notes, "left from earlier");
        assert_eq!(items[7].notes, "custom note");
    }

    #[test]
    fn test_edit_reenters_inspection() {
        let mut wizard = at_inspection(3);
        wizard.pass().unwrap();
        wizard.pass().unwrap();
        wizard.pass().unwrap();
        assert_eq!(wizard.step(), WizardStep::Review);

        wizard.edit_item("item-8").unwrap();
        assert_eq!(wizard.step(), WizardStep::Inspection);
        assert_eq!(wizard.progress(), (1, 3));

        wizard.fail("dent").unwrap();
        wizard.pass().unwrap();
        wizard.pass().unwrap();
        assert_eq!(wizard.step(), WizardStep::Review);
        assert_eq!(wizard.summary(), InspectionSummary { passed: 2, failed: 1, pending: 0, total: 3 });
    }

    #[test]
    fn test_edit_unknown_item() {
        let mut wizard = at_inspection(1);
        wizard.pass().unwrap();
        assert_eq!(
            wizard.edit_item("item-99"),
            Err(WizardError::UnknownItem("item-99".into()))
        );
        assert_eq!(wizard.step(), WizardStep::Review);
    }

    #[test]
    fn test_empty_item_list() {
        let mut wizard = at_inspection(0);
        assert_eq!(wizard.pass(), Err(WizardError::NoCurrentItem));
        wizard.fully_fail().unwrap();
        assert_eq!(wizard.step(), WizardStep::Review);
        assert_eq!(wizard.summary().total, 0);
    }

    fn at_generate(verdict: Verdict) -> Wizard<MemoryWorkbook> {
        let mut wizard = at_inspection(3);
        wizard.pass().unwrap();
        wizard.fail("bracket loose").unwrap();
        wizard.fully_fail().unwrap();
        wizard.finish_review().unwrap();
        wizard.submit_initials(" jd ").unwrap();
        wizard.choose_verdict(verdict).unwrap();
        wizard
    }

    #[test]
    fn test_initials_validation_keeps_step() {
        let mut wizard = at_inspection(1);
        wizard.pass().unwrap();
        wizard.finish_review().unwrap();
        assert_eq!(wizard.step(), WizardStep::Initials);

        for bad in ["", "A", "ABCDEF", "A1"] {
            assert!(wizard.submit_initials(bad).is_err(), "accepted {bad:?}");
            assert_eq!(wizard.step(), WizardStep::Initials);
        }
        wizard.submit_initials("jd").unwrap();
        assert_eq!(wizard.data().unwrap().inspector_initials, "JD");
        assert_eq!(wizard.step(), WizardStep::Bonus);
    }

    #[test]
    fn test_generate_writes_back() {
        let mut wizard = at_generate(Verdict::Fail);
        assert_eq!(wizard.step(), WizardStep::Generate);

        let file = wizard.generate().unwrap();
        assert_eq!(file.file_name, "IRB6700 PDI - SN001 - Fail.xlsx");
        assert!(wizard.is_completed());

        let sheet = wizard.workbook().unwrap().worksheet().unwrap();
        let text = |a: &str| sheet.get_value(a.parse().unwrap()).to_text();
        assert_eq!(text("C8"), "Y");
        assert_eq!(text("E8"), "JD");
        assert_eq!(text("C9"), "X");
        assert_eq!(text("D9"), "bracket loose");
        assert_eq!(text("D10"), DEFAULT_FAILURE_NOTE);
        assert_eq!(text("E10"), "JD");
    }

    #[test]
    fn test_generate_without_workbook_keeps_data() {
        let wizard = at_generate(Verdict::Pass);
        let mut restored: Wizard<MemoryWorkbook> = Wizard::restore(wizard.snapshot().unwrap());

        let result = restored.generate();
        assert!(matches!(result, Err(GenerateError::Output(Error::MissingWorkbook))));
        assert_eq!(restored.error(), Some("Original workbook not found"));
        assert_eq!(restored.step(), WizardStep::Generate);
        assert_eq!(restored.data().unwrap().inspector_initials, "JD");

        restored.attach_workbook(template(3)).unwrap();
        let file = restored.generate().unwrap();
        assert_eq!(file.file_name, "IRB6700 PDI - SN001 - Pass.xlsx");
        assert_eq!(restored.error(), None);
    }

    #[test]
    fn test_verdict_can_be_rechosen() {
        let mut wizard = at_generate(Verdict::Pass);
        wizard.step = WizardStep::Bonus;
        wizard.choose_verdict(Verdict::Fail).unwrap();
        assert_eq!(wizard.data().unwrap().verdict, Some(Verdict::Fail));
    }

    #[test]
    fn test_reset() {
        let mut wizard = at_generate(Verdict::Pass);
        wizard.generate().unwrap();
        wizard.start_new();
        assert_eq!(wizard.step(), WizardStep::Upload);
        assert!(wizard.data().is_none());
        assert!(!wizard.has_workbook());
        assert!(wizard.snapshot().is_none());
        assert!(!wizard.is_completed());
    }

    #[test]
    fn test_snapshot_restore() {
        let mut wizard = at_inspection(4);
        wizard.pass().unwrap();

        let snapshot = wizard.snapshot().unwrap();
        assert_eq!(snapshot.step, WizardStep::Inspection);

        let restored: Wizard<MemoryWorkbook> = Wizard::restore(snapshot);
        assert_eq!(restored.step(), WizardStep::Inspection);
        assert_eq!(restored.progress(), (2, 4));
        assert!(!restored.has_workbook());
        assert_eq!(restored.data(), wizard.data());
    }

    #[test]
    fn test_restore_clamps_cursor() {
        let wizard = at_inspection(2);
        let mut snapshot = wizard.snapshot().unwrap();
        snapshot.data.current_item_index = 40;
        let restored: Wizard<MemoryWorkbook> = Wizard::restore(snapshot);
        assert_eq!(restored.progress(), (2, 2));
    }

    /// 範囲外の行番号は生成エラーになり、入力は残る
    #[test]
    fn test_generate_with_out_of_range_row_fails() {
        let mut wizard = at_generate(Verdict::Pass);
        wizard.data.as_mut().unwrap().items[0].row_index = u32::MAX;
        assert!(matches!(
            wizard.generate(),
            Err(GenerateError::Output(Error::InvalidCellRef(_)))
        ));
        assert!(!wizard.is_completed());
        assert!(wizard.error().is_some());
        assert!(wizard.data().is_some());
    }

    #[test]
    fn test_attach_requires_session() {
        let mut wizard: Wizard<MemoryWorkbook> = Wizard::new();
        assert_eq!(wizard.attach_workbook(template(1)), Err(WizardError::NoSession));
    }
}
