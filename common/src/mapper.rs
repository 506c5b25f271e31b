//! レイアウトマッパー
//!
//! 固定セル配置 ⇔ ドメインモデルの変換。
//! - 抽出: ヘッダー8セル + B列8〜44行 → HeaderInfo / InspectionItem
//! - 書き戻し: 判定結果を C/D/E 列とヘッダーセルへ値だけ書き込む
//!
//! ブックの読み書き自体は `Workbook` / `Worksheet` トレイトの実装側に任せる。

use crate::error::{Error, Result};
use crate::layout::{
    CellRef, HEADER_FIELDS, INITIALS_COLUMN, ITEM_COLUMN, ITEM_FIRST_ROW, ITEM_LAST_ROW,
    NOTES_COLUMN, STATUS_COLUMN, PASS_MARK, FAIL_MARK,
};
use crate::types::{
    DerivedHeader, ExcelParseResult, HeaderField, HeaderInfo, InspectionData, InspectionItem,
    ItemStatus, Verdict,
};
use chrono::{Duration, NaiveDate, Timelike};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// セルの生の値
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Excelシリアル値（1900年基準）
    DateTime(f64),
    /// リッチテキストの各ランの文字列
    RichText(Vec<String>),
    /// 数式と計算済みの結果
    Formula {
        formula: String,
        result: Box<CellValue>,
    },
    /// `#N/A` などのエラー値
    Error(String),
}

impl CellValue {
    /// セル値を文字列化（前後空白は除去）
    ///
    /// リッチテキストはランを連結、数式は計算結果を使う。
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::DateTime(serial) => format_excel_serial(*serial),
            CellValue::RichText(runs) => runs.concat().trim().to_string(),
            CellValue::Formula { result, .. } => result.to_text(),
            CellValue::Error(code) => code.trim().to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_text().is_empty()
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

/// Excelシリアル値 → `YYYY-MM-DD`（時刻があれば ` HH:MM:SS` 付き）
fn format_excel_serial(serial: f64) -> String {
    // 9999-12-31 を超える値は日付として扱わない
    if !serial.is_finite() || !(0.0..=2_958_465.0).contains(&serial) {
        return serial.to_string();
    }
    // 1900年うるう年バグ: 60 = 1900-02-29（実在しない）
    let epoch = if serial < 61.0 {
        NaiveDate::from_ymd_opt(1899, 12, 31)
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)
    };
    let Some(epoch) = epoch.and_then(|d| d.and_hms_opt(0, 0, 0)) else {
        return serial.to_string();
    };
    let millis = (serial * 86_400_000.0).round() as i64;
    let Some(datetime) = epoch.checked_add_signed(Duration::milliseconds(millis)) else {
        return serial.to_string();
    };
    if datetime.num_seconds_from_midnight() == 0 {
        datetime.format("%Y-%m-%d").to_string()
    } else {
        datetime.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// ワークシート1枚へのアクセス
pub trait Worksheet {
    fn name(&self) -> &str;

    /// 値の読み出し。未入力セルは `CellValue::Empty`
    fn get_value(&self, cell: CellRef) -> CellValue;

    /// 値だけを書き込む（書式は変更しない）
    fn set_value(&mut self, cell: CellRef, value: &str);
}

/// ブック（先頭シートのみ扱う）
pub trait Workbook {
    type Sheet: Worksheet;

    fn worksheet(&self) -> Option<&Self::Sheet>;

    fn worksheet_mut(&mut self) -> Option<&mut Self::Sheet>;

    /// ファイルのバイト列に書き出し
    fn encode(&self) -> Result<Vec<u8>>;
}

// ============================================
// 抽出
// ============================================

/// ヘッダー8項目を抽出
///
/// 空セルも項目として残す（必須チェックは入力画面で行う）。
pub fn extract_header<S: Worksheet + ?Sized>(sheet: &S) -> Result<HeaderInfo> {
    let mut fields = Vec::with_capacity(HEADER_FIELDS.len());
    for def in HEADER_FIELDS.iter() {
        let cell_address: CellRef = def.address.parse()?;
        let value = sheet.get_value(cell_address).to_text();
        fields.push(HeaderField {
            label: def.label.to_string(),
            value,
            cell_address,
            is_required: def.is_required,
        });
    }
    Ok(HeaderInfo::from_fields(fields))
}

/// 検査項目を抽出（空行はスキップ）
pub fn extract_items<S: Worksheet + ?Sized>(sheet: &S) -> Result<Vec<InspectionItem>> {
    let mut items = Vec::new();
    for row in ITEM_FIRST_ROW..=ITEM_LAST_ROW {
        let description = sheet.get_value(CellRef::at(ITEM_COLUMN, row)?).to_text();
        if description.is_empty() {
            continue;
        }
        tracing::trace!("Row {}: {:?}", row, description);
        items.push(InspectionItem::from_row(row, description));
    }
    Ok(items)
}

/// ブックからヘッダーと検査項目を読み出す
pub fn parse_workbook<W: Workbook>(workbook: W) -> Result<ExcelParseResult<W>> {
    let sheet = workbook.worksheet().ok_or(Error::NoWorksheet)?;
    let header_info = extract_header(sheet)?;
    let items = extract_items(sheet)?;
    tracing::info!(
        "Parsed worksheet {:?}: {} header fields, {} items",
        sheet.name(),
        header_info.fields.len(),
        items.len()
    );
    Ok(ExcelParseResult { header_info, items, workbook })
}

/// ヘッダー項目から機種・シリアル・日付を導出
///
/// ラベルの部分一致（大文字小文字無視）で最初に見つかった項目の値を使う。
pub fn derive_header(fields: &[HeaderField]) -> DerivedHeader {
    let find = |keys: &[&str]| -> String {
        fields
            .iter()
            .find(|f| {
                let label = f.label.to_lowercase();
                keys.iter().any(|k| label.contains(k))
            })
            .map(|f| f.value.clone())
            .unwrap_or_default()
    };

    DerivedHeader {
        robot_model: find(&["model"]),
        serial_number: find(&["serial", "s/n"]),
        date: find(&["date"]),
    }
}

// ============================================
// 書き戻し
// ============================================

/// 判定結果をシートに書き込む
///
/// - ヘッダー: 値が空でない項目のみ
/// - 判定済み項目: C列に Y/X、イニシャルがあればE列
/// - 不合格でメモあり: D列にメモ
/// - 未判定項目は触らない
pub fn write_back_sheet<S: Worksheet + ?Sized>(data: &InspectionData, sheet: &mut S) -> Result<()> {
    for field in &data.header_info.fields {
        if field.value.is_empty() {
            continue;
        }
        tracing::debug!("Setting {} = {:?}", field.cell_address, field.value);
        sheet.set_value(field.cell_address, &field.value);
    }

    for item in &data.items {
        let row = item.sheet_row();

        if item.status != ItemStatus::Pending {
            let mark = if item.status == ItemStatus::Pass { PASS_MARK } else { FAIL_MARK };
            let cell = CellRef::at(STATUS_COLUMN, row)?;
            tracing::debug!("Setting {} = {:?}", cell, mark);
            sheet.set_value(cell, mark);

            if !data.inspector_initials.is_empty() {
                let cell = CellRef::at(INITIALS_COLUMN, row)?;
                tracing::debug!("Setting {} = {:?}", cell, data.inspector_initials);
                sheet.set_value(cell, &data.inspector_initials);
            }
        }

        if item.status == ItemStatus::Fail && !item.notes.is_empty() {
            let cell = CellRef::at(NOTES_COLUMN, row)?;
            tracing::debug!("Setting {} = {:?}", cell, item.notes);
            sheet.set_value(cell, &item.notes);
        }
    }

    Ok(())
}

/// 元ブックへ書き戻す
pub fn write_back<W: Workbook>(data: &InspectionData, workbook: Option<&mut W>) -> Result<()> {
    let workbook = workbook.ok_or(Error::MissingWorkbook)?;
    let sheet = workbook.worksheet_mut().ok_or(Error::NoWorksheet)?;
    write_back_sheet(data, sheet)
}

/// ファイル名から除去する文字
fn sanitize_filename_part(value: &str) -> String {
    lazy_static::lazy_static! {
        static ref ILLEGAL_RE: Regex = Regex::new(r#"[<>:"/\\|?*]"#).unwrap();
    }
    ILLEGAL_RE.replace_all(value, "").trim().to_string()
}

/// 出力ファイル名: `{機種} PDI - {シリアル} - {Pass|Fail|Pending}.xlsx`
pub fn output_filename(robot_model: &str, serial_number: &str, verdict: Option<Verdict>) -> String {
    let part = |value: &str| {
        let clean = sanitize_filename_part(value);
        if clean.is_empty() { "Unknown".to_string() } else { clean }
    };
    let pass_fail = verdict.map(|v| v.label()).unwrap_or("Pending");
    format!("{} PDI - {} - {}.xlsx", part(robot_model), part(serial_number), pass_fail)
}
