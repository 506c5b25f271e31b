//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use pdi_sheet::error::PdiError;
use pdi_sheet::examine;
use pdi_sheet::interactive::{run_interactive_inspection, InspectOptions};
use pdi_sheet_common::session::MemoryStore;
use pdi_sheet_common::{GenerateError, WizardError, WizardStep};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// 存在しないテンプレートを確認した場合
#[test]
fn test_examine_nonexistent_template() {
    let result = examine::examine_template(Path::new("/nonexistent/path/template.xlsx"));
    assert!(matches!(result, Err(PdiError::FileNotFound(_))));
}

/// 存在しないテンプレートで検査を始めた場合
#[test]
fn test_inspect_nonexistent_template() {
    let options = InspectOptions {
        template: PathBuf::from("/nonexistent/path/template.xlsx"),
        output_dir: PathBuf::from("."),
        resume: false,
        auto_resume: false,
        default_initials: None,
    };
    let mut store = MemoryStore::new();
    let result = run_interactive_inspection(&options, &mut store);
    assert!(matches!(result, Err(PdiError::FileNotFound(_))));
}

/// 保存なしで --resume した場合
#[test]
fn test_resume_without_saved_session() {
    let dir = tempdir().expect("Failed to create temp dir");
    let template = dir.path().join("template.xlsx");
    std::fs::write(&template, pdi_sheet_common::export::sample_template_bytes().unwrap()).unwrap();

    let options = InspectOptions {
        template,
        output_dir: dir.path().to_path_buf(),
        resume: true,
        auto_resume: false,
        default_initials: None,
    };
    let mut store = MemoryStore::new();
    let result = run_interactive_inspection(&options, &mut store);
    assert!(matches!(result, Err(PdiError::NoSavedSession)));
}

/// xlsxでないファイルを確認した場合
#[test]
fn test_examine_invalid_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("broken.xlsx");
    std::fs::write(&path, "not a workbook").unwrap();

    let result = examine::examine_template(&path);
    assert!(matches!(result, Err(PdiError::Template(_))));
}

/// 生成エラーの変換
#[test]
fn test_generate_error_conversion() {
    let err: PdiError = GenerateError::Output(pdi_sheet_common::Error::MissingWorkbook).into();
    assert!(matches!(err, PdiError::Template(pdi_sheet_common::Error::MissingWorkbook)));

    let err: PdiError = GenerateError::Wizard(WizardError::NoSession).into();
    assert!(matches!(err, PdiError::Wizard(WizardError::NoSession)));
}

/// PdiErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        PdiError::Config("テスト設定エラー".to_string()),
        PdiError::FileNotFound("template.xlsx".to_string()),
        PdiError::Template(pdi_sheet_common::Error::NoWorksheet),
        PdiError::Wizard(WizardError::WrongStep {
            expected: WizardStep::Review,
            actual: WizardStep::Header,
        }),
        PdiError::NoSavedSession,
        PdiError::Prompt("interrupted".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "Error display should not be empty");
    }

    let err = PdiError::Wizard(WizardError::WrongStep {
        expected: WizardStep::Review,
        actual: WizardStep::Header,
    });
    assert_eq!(
        err.to_string(),
        "action belongs to the review step but the wizard is at header"
    );
}
