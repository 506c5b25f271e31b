//! テンプレートレイアウト定義
//!
//! PDI検査シートのセル配置は固定。ヘッダー8項目と検査項目の行範囲、
//! 書き戻し先の列をここで一元管理する。

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Excelの最大列（XFD）
pub const MAX_COLUMN: u32 = 16_384;
/// Excelの最大行
pub const MAX_ROW: u32 = 1_048_576;

/// A1形式のセル座標（行・列とも1始まり）
///
/// 行→列の順で並ぶので、`BTreeMap` のキーにすると行優先順になる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellRef {
    row: u32,
    col: u32,
}

impl CellRef {
    /// 行・列番号から生成（1始まり）
    pub fn new(col: u32, row: u32) -> Result<Self> {
        if col == 0 || col > MAX_COLUMN || row == 0 || row > MAX_ROW {
            return Err(Error::InvalidCellRef(format!("column {col}, row {row}")));
        }
        Ok(Self { row, col })
    }

    /// 列文字と行番号から生成（`CellRef::at('C', 10)` → C10）
    pub fn at(column: char, row: u32) -> Result<Self> {
        Self::new(column_index(&column.to_string())?, row)
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    pub fn col(&self) -> u32 {
        self.col
    }

    /// 0始まりの (行, 列)。calamine の座標系
    pub fn zero_based(&self) -> (u32, u32) {
        (self.row - 1, self.col - 1)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_name(self.col), self.row)
    }
}

impl FromStr for CellRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        lazy_static::lazy_static! {
            static ref A1_RE: Regex = Regex::new(r"^([A-Za-z]{1,3})([1-9][0-9]{0,6})$").unwrap();
        }

        let trimmed = s.trim();
        let caps = A1_RE
            .captures(trimmed)
            .ok_or_else(|| Error::InvalidCellRef(s.to_string()))?;
        let col = column_index(&caps[1])?;
        let row: u32 = caps[2]
            .parse()
            .map_err(|_| Error::InvalidCellRef(s.to_string()))?;
        Self::new(col, row).map_err(|_| Error::InvalidCellRef(s.to_string()))
    }
}

impl TryFrom<String> for CellRef {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<CellRef> for String {
    fn from(cell: CellRef) -> Self {
        cell.to_string()
    }
}

/// 列文字 → 列番号（A=1, Z=26, AA=27）
pub fn column_index(letters: &str) -> Result<u32> {
    if letters.is_empty() || letters.len() > 3 {
        return Err(Error::InvalidCellRef(letters.to_string()));
    }
    let mut index: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(Error::InvalidCellRef(letters.to_string()));
        }
        index = index * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }
    if index > MAX_COLUMN {
        return Err(Error::InvalidCellRef(letters.to_string()));
    }
    Ok(index)
}

/// 列番号 → 列文字
pub fn column_name(mut col: u32) -> String {
    let mut name = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        name.push(b'A' + rem as u8);
        col = (col - 1) / 26;
    }
    name.reverse();
    String::from_utf8(name).unwrap_or_default()
}

// ============================================
// 固定レイアウト
// ============================================

/// ヘッダー項目の定義
#[derive(Debug, Clone, Copy)]
pub struct HeaderFieldDef {
    pub label: &'static str,
    pub address: &'static str,
    pub is_required: bool,
}

/// ヘッダー8項目（表示順 = 抽出順）
pub const HEADER_FIELDS: [HeaderFieldDef; 8] = [
    HeaderFieldDef { label: "Customer Name", address: "B3", is_required: true },
    HeaderFieldDef { label: "Serial Number", address: "B4", is_required: true },
    HeaderFieldDef { label: "Box Number", address: "B5", is_required: false },
    HeaderFieldDef { label: "Dispatch Location", address: "B6", is_required: false },
    HeaderFieldDef { label: "Model", address: "D3", is_required: true },
    HeaderFieldDef { label: "Supervisor Name", address: "D4", is_required: false },
    HeaderFieldDef { label: "Inspector Name", address: "D5", is_required: false },
    HeaderFieldDef { label: "Date", address: "D6", is_required: false },
];

/// 検査項目（質問文）の列
pub const ITEM_COLUMN: char = 'B';
/// 検査項目の先頭行（1始まり、含む）
pub const ITEM_FIRST_ROW: u32 = 8;
/// 検査項目の最終行（1始まり、含む）
pub const ITEM_LAST_ROW: u32 = 44;

/// 合否マーク（Y/X）の列
pub const STATUS_COLUMN: char = 'C';
/// 不合格メモの列
pub const NOTES_COLUMN: char = 'D';
/// 検査員イニシャルの列
pub const INITIALS_COLUMN: char = 'E';

pub const PASS_MARK: &str = "Y";
pub const FAIL_MARK: &str = "X";
