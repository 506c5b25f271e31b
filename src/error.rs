use pdi_sheet_common::{GenerateError, WizardError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdiError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("テンプレートを読み込めません: {0}")]
    Template(#[from] pdi_sheet_common::Error),

    #[error("{0}")]
    Wizard(#[from] WizardError),

    #[error("保存されたセッションがありません。`pdi-sheet inspect <TEMPLATE>` で新しく開始してください")]
    NoSavedSession,

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

impl From<GenerateError> for PdiError {
    fn from(e: GenerateError) -> Self {
        match e {
            GenerateError::Wizard(e) => PdiError::Wizard(e),
            GenerateError::Output(e) => PdiError::Template(e),
        }
    }
}

impl From<dialoguer::Error> for PdiError {
    fn from(e: dialoguer::Error) -> Self {
        PdiError::Prompt(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PdiError>;
