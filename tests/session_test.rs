//! セッション保存テスト
//!
//! ファイル保存のセッションストアと、保存内容からの再開を検証

use pdi_sheet::session_file::FileStore;
use pdi_sheet_common::session::{SessionSnapshot, SessionStore};
use pdi_sheet_common::{parse_xlsx, Wizard, WizardStep, XlsxWorkbook};
use tempfile::tempdir;

fn started_wizard() -> Wizard<XlsxWorkbook> {
    let template = pdi_sheet_common::export::sample_template_bytes().unwrap();
    let mut wizard = Wizard::new();
    wizard.load(parse_xlsx(&template)).unwrap();
    let mut values = vec![String::new(); 8];
    values[0] = "ACME".to_string();
    values[1] = "SN-42".to_string();
    values[4] = "IRB 1200".to_string();
    wizard.submit_header(&values).unwrap();
    wizard
}

/// 保存ファイルがない場合
#[test]
fn test_load_without_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = FileStore::in_dir(dir.path());
    assert!(!store.exists());
    assert!(store.load().is_none());
}

/// 保存・読み込み・削除
#[test]
fn test_save_load_clear() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut store = FileStore::in_dir(dir.path());

    let mut wizard = started_wizard();
    wizard.pass().unwrap();
    wizard.fail("paint chipped").unwrap();
    store.save(&wizard.snapshot().unwrap()).expect("セッション保存失敗");

    assert!(store.path().ends_with("inspection-wizard-data.json"));
    let loaded = store.load().expect("セッションが見つからない");
    assert_eq!(loaded.step, WizardStep::Inspection);
    assert_eq!(loaded.data.current_item_index, 2);
    assert_eq!(loaded.data.items[1].notes, "paint chipped");
    assert_eq!(Some(&loaded.data), wizard.data());

    store.clear().unwrap();
    assert!(!store.exists());
    // 2回目の削除もエラーにならない
    store.clear().unwrap();
}

/// 壊れたファイルは保存なし扱い
#[test]
fn test_corrupt_file_ignored() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = FileStore::in_dir(dir.path());
    std::fs::write(store.path(), "{\"step\": 12").unwrap();

    assert!(store.exists());
    assert!(store.load().is_none());
}

/// 保存ディレクトリが無ければ作る
#[test]
fn test_save_creates_directory() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut store = FileStore::in_dir(&dir.path().join("nested").join("config"));
    store.save(&started_wizard().snapshot().unwrap()).unwrap();
    assert!(store.load().is_some());
}

/// 再開後はテンプレートを付け直せば生成できる
#[test]
fn test_resume_and_generate() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut store = FileStore::in_dir(dir.path());

    let mut wizard = started_wizard();
    wizard.fully_fail().unwrap();
    wizard.finish_review().unwrap();
    wizard.submit_initials("kt").unwrap();
    store.save(&wizard.snapshot().unwrap()).unwrap();
    drop(wizard);

    let snapshot: SessionSnapshot = store.load().unwrap();
    let mut resumed: Wizard<XlsxWorkbook> = Wizard::restore(snapshot);
    assert_eq!(resumed.step(), WizardStep::Bonus);
    assert!(!resumed.has_workbook());

    let template = pdi_sheet_common::export::sample_template_bytes().unwrap();
    resumed.attach_workbook(XlsxWorkbook::from_bytes(&template).unwrap()).unwrap();
    resumed.choose_verdict(pdi_sheet_common::Verdict::Fail).unwrap();

    let file = resumed.generate().unwrap();
    assert_eq!(file.file_name, "IRB 1200 PDI - SN-42 - Fail.xlsx");

    let out = dir.path().join(&file.file_name);
    std::fs::write(&out, &file.bytes).unwrap();
    let reparsed = parse_xlsx(&std::fs::read(&out).unwrap()).unwrap();
    assert_eq!(reparsed.header_info.fields[0].value, "ACME");
    assert_eq!(reparsed.header_info.robot_model(), "IRB 1200");
}
