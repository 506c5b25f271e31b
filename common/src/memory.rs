//! メモリ上のブック
//!
//! バイナリ形式を持たない環境（テストやデバッグ）向け。`encode` はセルのJSONダンプ。

use crate::error::Result;
use crate::layout::CellRef;
use crate::mapper::{CellValue, Workbook, Worksheet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemorySheet {
    name: String,
    cells: BTreeMap<CellRef, CellValue>,
}

impl MemorySheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
        }
    }

    /// A1形式で値を設定（テスト用。不正な座標は無視）
    pub fn put(&mut self, address: &str, value: CellValue) {
        if let Ok(cell) = address.parse() {
            self.cells.insert(cell, value);
        }
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

impl Worksheet for MemorySheet {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_value(&self, cell: CellRef) -> CellValue {
        self.cells.get(&cell).cloned().unwrap_or(CellValue::Empty)
    }

    fn set_value(&mut self, cell: CellRef, value: &str) {
        self.cells.insert(cell, CellValue::Text(value.to_string()));
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryWorkbook {
    pub sheets: Vec<MemorySheet>,
}

impl MemoryWorkbook {
    pub fn with_sheet(sheet: MemorySheet) -> Self {
        Self { sheets: vec![sheet] }
    }
}

impl Workbook for MemoryWorkbook {
    type Sheet = MemorySheet;

    fn worksheet(&self) -> Option<&MemorySheet> {
        self.sheets.first()
    }

    fn worksheet_mut(&mut self) -> Option<&mut MemorySheet> {
        self.sheets.first_mut()
    }

    fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}
