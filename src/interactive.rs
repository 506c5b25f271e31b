//! 対話式検査ウィザード
//!
//! dialoguer のプロンプトでステップを順に進める。
//! 状態が変わるたびにスナップショットを保存するので、途中終了しても `--resume` で再開できる。

use crate::error::{PdiError, Result};
use dialoguer::{Confirm, Input, Select};
use pdi_sheet_common::session::SessionStore;
use pdi_sheet_common::validate::FieldErrors;
use pdi_sheet_common::{
    parse_xlsx, InspectionItem, ItemStatus, Verdict, Wizard, WizardError, WizardStep, Workbook,
    XlsxWorkbook,
};
use std::path::{Path, PathBuf};

/// `inspect` の設定
#[derive(Debug, Clone)]
pub struct InspectOptions {
    pub template: PathBuf,
    pub output_dir: PathBuf,
    /// 保存済みセッションから再開
    pub resume: bool,
    /// 確認なしで再開
    pub auto_resume: bool,
    pub default_initials: Option<String>,
}

/// 検査ステップの操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectionAction {
    Pass,
    Fail(String),
    Previous,
    /// 残り全部不合格
    FullyFail,
    /// 保存して終了
    Quit,
}

/// レビューの操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewAction {
    Continue,
    Edit(String),
    Quit,
}

/// ループを続けるか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// 検査ステップの操作を適用
pub fn apply_inspection_action<W: Workbook>(
    wizard: &mut Wizard<W>,
    action: InspectionAction,
) -> std::result::Result<Flow, WizardError> {
    match action {
        InspectionAction::Pass => wizard.pass()?,
        InspectionAction::Fail(note) => wizard.fail(&note)?,
        InspectionAction::Previous => wizard.previous()?,
        InspectionAction::FullyFail => wizard.fully_fail()?,
        InspectionAction::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

/// レビューの操作を適用
pub fn apply_review_action<W: Workbook>(
    wizard: &mut Wizard<W>,
    action: ReviewAction,
) -> std::result::Result<Flow, WizardError> {
    match action {
        ReviewAction::Continue => wizard.finish_review()?,
        ReviewAction::Edit(id) => wizard.edit_item(&id)?,
        ReviewAction::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

/// 項目の一覧表示用の1行
pub fn item_line(item: &InspectionItem) -> String {
    let mark = match item.status {
        ItemStatus::Pass => "✔",
        ItemStatus::Fail => "✗",
        ItemStatus::Pending => "·",
    };
    let mut line = format!("{} #{} {}", mark, item.item_number, item.description);
    if item.status == ItemStatus::Fail && !item.notes.is_empty() {
        line.push_str(&format!("  ({})", item.notes));
    }
    line
}

fn save<W: Workbook>(wizard: &Wizard<W>, store: &mut impl SessionStore) -> Result<()> {
    if let Some(snapshot) = wizard.snapshot() {
        store.save(&snapshot)?;
    }
    Ok(())
}

fn read_template(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(PdiError::FileNotFound(path.display().to_string()));
    }
    Ok(std::fs::read(path)?)
}

/// 保存済みセッションを使うか、テンプレートから新規に始めるか
fn open_wizard(
    options: &InspectOptions,
    bytes: &[u8],
    store: &mut impl SessionStore,
) -> Result<Wizard<XlsxWorkbook>> {
    let saved = store.load();

    let resume = match &saved {
        Some(snapshot) if options.resume || options.auto_resume => {
            tracing::debug!("Resuming session at step {}", snapshot.step);
            true
        }
        Some(snapshot) => Confirm::new()
            .with_prompt(format!(
                "保存された検査があります（{}ステップ）。再開しますか？",
                snapshot.step
            ))
            .default(true)
            .interact()?,
        None if options.resume => return Err(PdiError::NoSavedSession),
        None => false,
    };

    match saved {
        Some(snapshot) if resume => {
            let mut wizard = Wizard::restore(snapshot);
            wizard.attach_workbook(XlsxWorkbook::from_bytes(bytes)?)?;
            println!("✔ 保存された検査を再開しました\n");
            Ok(wizard)
        }
        _ => {
            store.clear()?;
            let mut wizard = Wizard::new();
            wizard.load(parse_xlsx(bytes))?;
            if let Some(message) = wizard.error() {
                return Err(PdiError::Config(message.to_string()));
            }
            save(&wizard, store)?;
            Ok(wizard)
        }
    }
}

/// 対話式で検査を行い、生成したファイルのパスを返す（途中終了なら None）
pub fn run_interactive_inspection(
    options: &InspectOptions,
    store: &mut impl SessionStore,
) -> Result<Option<PathBuf>> {
    let bytes = read_template(&options.template)?;
    let mut wizard = open_wizard(options, &bytes, store)?;

    if let Some(data) = wizard.data() {
        println!(
            "テンプレート: {} ({}項目)\n",
            options.template.display(),
            data.items.len()
        );
    }

    loop {
        let flow = match wizard.step() {
            WizardStep::Upload => {
                return Err(PdiError::Wizard(WizardError::NoSession));
            }
            WizardStep::Header => prompt_header(&mut wizard)?,
            WizardStep::Inspection => {
                let action = prompt_inspection_action(&wizard)?;
                report(apply_inspection_action(&mut wizard, action))?
            }
            WizardStep::Review => {
                let action = prompt_review_action(&wizard)?;
                report(apply_review_action(&mut wizard, action))?
            }
            WizardStep::Initials => prompt_initials(&mut wizard, options.default_initials.as_deref())?,
            WizardStep::Bonus => prompt_verdict(&mut wizard)?,
            WizardStep::Generate => {
                match generate(&mut wizard, &options.output_dir)? {
                    Some(path) => {
                        store.clear()?;
                        return Ok(Some(path));
                    }
                    None => Flow::Quit,
                }
            }
        };

        save(&wizard, store)?;

        if flow == Flow::Quit {
            println!("\n保存して終了しました。`pdi-sheet inspect <TEMPLATE> --resume` で再開できます");
            return Ok(None);
        }
    }
}

/// 入力エラーは表示して同じステップを続ける
fn report(result: std::result::Result<Flow, WizardError>) -> Result<Flow> {
    match result {
        Ok(flow) => Ok(flow),
        Err(e @ (WizardError::Note(_) | WizardError::Initials(_) | WizardError::Header(_))) => {
            println!("  ✗ {}\n", e);
            Ok(Flow::Continue)
        }
        Err(e) => Err(e.into()),
    }
}

fn print_field_errors(errors: &FieldErrors) {
    for label in errors.labels() {
        println!("  ✗ {}: {}", label, errors.get(label).unwrap_or_default());
    }
    println!();
}

// ============================================
// 各ステップのプロンプト
// ============================================

fn prompt_header(wizard: &mut Wizard<XlsxWorkbook>) -> Result<Flow> {
    let fields = match wizard.data() {
        Some(data) => data.header_info.fields.clone(),
        None => return Err(PdiError::Wizard(WizardError::NoSession)),
    };

    println!("[ヘッダー情報] * は必須");
    let mut values = Vec::with_capacity(fields.len());
    for field in &fields {
        let mut initial = field.value.clone();
        if initial.is_empty() && field.label == "Date" {
            initial = chrono::Local::now().format("%Y-%m-%d").to_string();
        }
        let prompt = if field.is_required {
            format!("{} *", field.label)
        } else {
            field.label.clone()
        };
        let value: String = Input::new()
            .with_prompt(prompt)
            .with_initial_text(initial)
            .allow_empty(true)
            .interact_text()?;
        values.push(value.trim().to_string());
    }

    match wizard.submit_header(&values) {
        Ok(()) => {
            println!("✔ ヘッダーを保存しました\n");
            Ok(Flow::Continue)
        }
        Err(WizardError::Header(errors)) => {
            print_field_errors(&errors);
            Ok(Flow::Continue)
        }
        Err(e) => Err(e.into()),
    }
}

fn prompt_inspection_action(wizard: &Wizard<XlsxWorkbook>) -> Result<InspectionAction> {
    let (position, total) = wizard.progress();
    let Some(item) = wizard.current_item() else {
        // 項目なし: 進められるのは一括不合格か終了のみ
        println!("検査項目がありません");
        let choice = Select::new()
            .items(&["レビューへ進む（全不合格扱い）", "保存して終了"])
            .default(0)
            .interact()?;
        return Ok(if choice == 0 { InspectionAction::FullyFail } else { InspectionAction::Quit });
    };

    println!("[{}/{}] #{} {}", position, total, item.item_number, item.description);
    if item.status != ItemStatus::Pending {
        println!("  現在: {}", item_line(item));
    }

    let choice = Select::new()
        .items(&["合格 (Y)", "不合格 (X)", "前の項目へ", "残りをすべて不合格", "保存して終了"])
        .default(0)
        .interact()?;

    let action = match choice {
        0 => InspectionAction::Pass,
        1 => {
            let note: String = Input::new()
                .with_prompt("不具合の内容")
                .with_initial_text(item.notes.clone())
                .allow_empty(true)
                .interact_text()?;
            InspectionAction::Fail(note)
        }
        2 => InspectionAction::Previous,
        3 => {
            let confirmed = Confirm::new()
                .with_prompt("残りの未判定項目をすべて不合格にしますか？")
                .default(false)
                .interact()?;
            if confirmed {
                InspectionAction::FullyFail
            } else {
                return prompt_inspection_action(wizard);
            }
        }
        _ => InspectionAction::Quit,
    };
    println!();
    Ok(action)
}

fn prompt_review_action(wizard: &Wizard<XlsxWorkbook>) -> Result<ReviewAction> {
    let summary = wizard.summary();
    println!(
        "[レビュー] 合格 {} / 不合格 {} / 未判定 {} （全{}項目）",
        summary.passed, summary.failed, summary.pending, summary.total
    );
    let items = wizard.data().map(|d| d.items.clone()).unwrap_or_default();
    for item in &items {
        println!("  {}", item_line(item));
    }
    println!();

    let choice = Select::new()
        .items(&["次へ（イニシャル入力）", "項目を修正", "保存して終了"])
        .default(0)
        .interact()?;

    match choice {
        0 => Ok(ReviewAction::Continue),
        1 if !items.is_empty() => {
            let lines: Vec<String> = items.iter().map(item_line).collect();
            let index = Select::new()
                .with_prompt("修正する項目")
                .items(&lines)
                .default(0)
                .interact()?;
            Ok(ReviewAction::Edit(items[index].id.clone()))
        }
        1 => Ok(ReviewAction::Continue),
        _ => Ok(ReviewAction::Quit),
    }
}

fn prompt_initials(wizard: &mut Wizard<XlsxWorkbook>, default: Option<&str>) -> Result<Flow> {
    let current = wizard
        .data()
        .map(|d| d.inspector_initials.clone())
        .filter(|s| !s.is_empty())
        .or_else(|| default.map(str::to_string))
        .unwrap_or_default();

    let input: String = Input::new()
        .with_prompt("検査者イニシャル (2〜5文字)")
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()?;

    match wizard.submit_initials(&input) {
        Ok(()) => Ok(Flow::Continue),
        Err(WizardError::Initials(e)) => {
            println!("  ✗ {}\n", e);
            Ok(Flow::Continue)
        }
        Err(e) => Err(e.into()),
    }
}

fn prompt_verdict(wizard: &mut Wizard<XlsxWorkbook>) -> Result<Flow> {
    let summary = wizard.summary();
    if summary.failed > 0 {
        println!("不合格項目: {}件", summary.failed);
    }
    let choice = Select::new()
        .with_prompt("ロボットの総合判定")
        .items(&["Pass", "Fail"])
        .default(if summary.failed > 0 { 1 } else { 0 })
        .interact()?;
    let verdict = if choice == 0 { Verdict::Pass } else { Verdict::Fail };
    wizard.choose_verdict(verdict)?;
    Ok(Flow::Continue)
}

/// ファイルを生成して保存。失敗時は再試行するか確認する
fn generate(wizard: &mut Wizard<XlsxWorkbook>, output_dir: &Path) -> Result<Option<PathBuf>> {
    loop {
        println!("Excelを生成中...");
        match wizard.generate() {
            Ok(file) => {
                std::fs::create_dir_all(output_dir)?;
                let path = output_dir.join(&file.file_name);
                std::fs::write(&path, &file.bytes)?;
                println!("✔ 保存しました: {}", path.display());
                return Ok(Some(path));
            }
            Err(e) => {
                println!("✗ 生成に失敗しました: {}", e);
                let retry = Confirm::new()
                    .with_prompt("もう一度試しますか？")
                    .default(true)
                    .interact()?;
                if !retry {
                    return Ok(None);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdi_sheet_common::mapper::parse_workbook;
    use pdi_sheet_common::{CellValue, MemorySheet, MemoryWorkbook};

    fn wizard(items: u32) -> Wizard<MemoryWorkbook> {
        let mut sheet = MemorySheet::new("PDI");
        sheet.put("B3", "ACME".into());
        sheet.put("B4", "SN1".into());
        sheet.put("D3", "IRB".into());
        for i in 0..items {
            sheet.put(&format!("B{}", 8 + i), CellValue::Text(format!("Item {}", i)));
        }
        let mut wizard = Wizard::new();
        wizard.load(parse_workbook(MemoryWorkbook::with_sheet(sheet))).unwrap();
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

    #[test]
    fn test_inspection_actions() {
        let mut wizard = wizard(3);
        assert_eq!(apply_inspection_action(&mut wizard, InspectionAction::Pass), Ok(Flow::Continue));
        assert_eq!(
            apply_inspection_action(&mut wizard, InspectionAction::Fail("dent".into())),
            Ok(Flow::Continue)
        );
        assert_eq!(wizard.progress(), (3, 3));
        apply_inspection_action(&mut wizard, InspectionAction::Previous).unwrap();
        assert_eq!(wizard.progress(), (2, 3));
        assert_eq!(apply_inspection_action(&mut wizard, InspectionAction::Quit), Ok(Flow::Quit));
        apply_inspection_action(&mut wizard, InspectionAction::FullyFail).unwrap();
        assert_eq!(wizard.step(), WizardStep::Review);
    }

    #[test]
    fn test_fail_without_note_is_rejected() {
        let mut wizard = wizard(2);
        let result = apply_inspection_action(&mut wizard, InspectionAction::Fail("  ".into()));
        assert!(matches!(result, Err(WizardError::Note(_))));
        assert!(matches!(report(result), Ok(Flow::Continue)));
        assert_eq!(wizard.progress(), (1, 2));
    }

    #[test]
    fn test_review_actions() {
        let mut wizard = wizard(2);
        wizard.pass().unwrap();
        wizard.pass().unwrap();
        apply_review_action(&mut wizard, ReviewAction::Edit("item-9".into())).unwrap();
        assert_eq!(wizard.step(), WizardStep::Inspection);
        assert_eq!(wizard.progress(), (2, 2));

        wizard.pass().unwrap();
        apply_review_action(&mut wizard, ReviewAction::Continue).unwrap();
        assert_eq!(wizard.step(), WizardStep::Initials);
    }

    #[test]
    fn test_item_line() {
        let mut item = InspectionItem::from_row(10, "Check bolts".into());
        assert_eq!(item_line(&item), "· #10 Check bolts");
        item.status = ItemStatus::Fail;
        item.notes = "loose".into();
        assert_eq!(item_line(&item), "✗ #10 Check bolts  (loose)");
    }
}
