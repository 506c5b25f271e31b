//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ブックとして読めないファイル（壊れたzip、xlsx以外など）
    #[error("Failed to read workbook: {0}")]
    Workbook(String),

    #[error("XML error: {0}")]
    Xml(String),

    /// 書き戻し対象の元ブックが未接続
    #[error("Original workbook not found")]
    MissingWorkbook,

    #[error("No worksheet found in workbook")]
    NoWorksheet,

    #[error("Invalid cell address: {0}")]
    InvalidCellRef(String),

    #[error("Failed to encode workbook: {0}")]
    Encode(String),

    /// セッション保存先（ブラウザのlocalStorageなど）の失敗
    #[error("Failed to access session storage: {0}")]
    Storage(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
