//! テンプレートの確認表示
//!
//! シート一覧と、固定レイアウトで読み取ったヘッダー・検査項目を表示する。

use crate::error::{PdiError, Result};
use calamine::{open_workbook_auto, Reader};
use pdi_sheet_common::{parse_xlsx, ExcelParseResult, Worksheet, Workbook, XlsxWorkbook};
use std::path::Path;

/// テンプレートの内容を表示
pub fn examine_template(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(PdiError::FileNotFound(path.display().to_string()));
    }

    let sheets = open_workbook_auto(path)
        .map(|book| book.sheet_names())
        .map_err(|e| PdiError::Template(pdi_sheet_common::Error::Workbook(e.to_string())))?;

    let bytes = std::fs::read(path)?;
    let parsed = parse_xlsx(&bytes)?;

    println!("{}", render_summary(&sheets, &parsed));
    Ok(())
}

/// 表示用テキスト
pub fn render_summary(sheet_names: &[String], parsed: &ExcelParseResult<XlsxWorkbook>) -> String {
    let mut out = String::new();

    let used = parsed
        .workbook
        .worksheet()
        .map(|s| s.name().to_string())
        .unwrap_or_default();
    out.push_str("シート:\n");
    for name in sheet_names {
        let marker = if *name == used { " ← 使用" } else { "" };
        out.push_str(&format!("  - {}{}\n", name, marker));
    }

    out.push_str("\nヘッダー:\n");
    for field in &parsed.header_info.fields {
        let required = if field.is_required { "*" } else { " " };
        let value = if field.value.is_empty() { "(空)" } else { field.value.as_str() };
        out.push_str(&format!(
            "  {} {:<4} {:<18} {}\n",
            required,
            field.cell_address.to_string(),
            field.label,
            value
        ));
    }

    out.push_str(&format!("\n検査項目: {}件\n", parsed.items.len()));
    for item in &parsed.items {
        out.push_str(&format!("  B{:<3} {}\n", item.item_number, item.description));
    }
    out
}
