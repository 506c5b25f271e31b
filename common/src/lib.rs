//! PDI Sheet Common Library
//!
//! CLIとWeb(WASM)で共有される型・レイアウト・ウィザード
//!
//! - `layout` / `mapper`: 固定セル配置とドメインモデルの変換
//! - `wizard` / `session`: 7ステップの状態機械とスナップショット保存
//! - `workbook`: xlsx の読み込みと差分書き戻し（feature `xlsx`）

pub mod error;
pub mod export;
pub mod layout;
pub mod mapper;
pub mod memory;
pub mod output;
pub mod session;
pub mod types;
pub mod validate;
pub mod wizard;

#[cfg(feature = "xlsx")]
pub mod workbook;

pub use error::{Error, Result};
pub use layout::{CellRef, HEADER_FIELDS};
pub use mapper::{
    derive_header, output_filename, parse_workbook, write_back, CellValue, Workbook, Worksheet,
};
pub use memory::{MemorySheet, MemoryWorkbook};
pub use output::{generate_file, GeneratedFile, XLSX_MIME};
pub use session::{decode_snapshot, MemoryStore, SessionSnapshot, SessionStore, STORAGE_KEY};
pub use types::{
    ExcelParseResult, HeaderField, HeaderInfo, InspectionData, InspectionItem, InspectionSummary,
    ItemStatus, Verdict,
};
pub use wizard::{GenerateError, Wizard, WizardError, WizardStep, DEFAULT_FAILURE_NOTE};

#[cfg(feature = "xlsx")]
pub use workbook::{XlsxSheet, XlsxWorkbook};

/// xlsxのバイト列を読み込んで解析する
#[cfg(feature = "xlsx")]
pub fn parse_xlsx(bytes: &[u8]) -> Result<ExcelParseResult<XlsxWorkbook>> {
    parse_workbook(XlsxWorkbook::from_bytes(bytes)?)
}
