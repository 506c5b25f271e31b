//! ファイル生成画面
//!
//! 元ブックに書き戻してダウンロードする。失敗しても入力は残り、再試行できる。
//! 保存データから再開した場合は元テンプレートを選び直してから生成する。

use crate::app::{apply, start_new_inspection, WizardState};
use crate::browser::{download_bytes, is_xlsx_name, log_error, read_file_bytes};
use leptos::prelude::*;
use leptos::task::spawn_local;
use pdi_sheet_common::{GenerateError, XlsxWorkbook};
use web_sys::HtmlInputElement;

#[component]
pub fn GenerateStep(wizard: WizardState) -> impl IntoView {
    let (is_generating, set_is_generating) = signal(false);
    let (local_error, set_local_error) = signal(None::<String>);
    let (file_name, set_file_name) = signal(None::<String>);

    let has_workbook = Memo::new(move |_| wizard.with(|w| w.has_workbook()));
    let completed = Memo::new(move |_| wizard.with(|w| w.is_completed()));
    let wizard_error = Memo::new(move |_| wizard.with(|w| w.error().map(str::to_string)));
    let error = move || local_error.get().or_else(|| wizard_error.get());

    let summary_row = move |label: &'static str, value: String| {
        let value = if value.is_empty() { "N/A".to_string() } else { value };
        view! {
            <div class="summary-row">
                <span class="text-muted">{label}</span>
                <span class="summary-value">{value}</span>
            </div>
        }
    };

    let rows = wizard.with_untracked(|w| {
        w.data()
            .map(|d| {
                let status = d.verdict.map(|v| v.label()).unwrap_or("Pending").to_string();
                vec![
                    ("Robot Model:", d.header_info.robot_model().to_string()),
                    ("Serial Number:", d.header_info.serial_number().to_string()),
                    ("Inspector:", d.inspector_initials.clone()),
                    ("Overall Status:", status),
                    ("Total Items:", d.items.len().to_string()),
                ]
            })
            .unwrap_or_default()
    });

    let on_generate = move |_| {
        if is_generating.get_untracked() {
            return;
        }
        set_is_generating.set(true);
        set_local_error.set(None);

        spawn_local(async move {
            match apply_generate(wizard) {
                Ok(file) => {
                    if let Err(e) = download_bytes(&file.bytes, &file.file_name, file.mime_type) {
                        let message = format!("Failed to download file: {:?}", e);
                        log_error(&message);
                        set_local_error.set(Some(message));
                    }
                    set_file_name.set(Some(file.file_name));
                }
                Err(e) => log_error(&e.to_string()),
            }
            set_is_generating.set(false);
        });
    };

    let on_attach = move |ev| {
        let input: HtmlInputElement = event_target(&ev);
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            return;
        };
        if !is_xlsx_name(&file.name()) {
            set_local_error.set(Some("Please upload a valid Excel file (.xlsx)".to_string()));
            return;
        }
        set_local_error.set(None);

        spawn_local(async move {
            let workbook = read_file_bytes(&file)
                .await
                .and_then(|bytes| XlsxWorkbook::from_bytes(&bytes).map_err(|e| e.to_string()));
            match workbook {
                Ok(workbook) => {
                    let _ = apply(wizard, |w| w.attach_workbook(workbook));
                }
                Err(message) => {
                    log_error(&message);
                    set_local_error.set(Some(message));
                }
            }
        });
    };

    view! {
        <Show
            when=move || completed.get()
            fallback=move || view! {
                <div class="step-container">
                    <div class="step-header">
                        <h1 class="step-title">"Generate Excel File"</h1>
                        <p class="step-subtitle">"Generate and download your completed inspection sheet"</p>
                    </div>

                    <div class="card">
                        <h2>"Review Summary"</h2>
                        <div class="summary">
                            {rows
                                .clone()
                                .into_iter()
                                .map(|(label, value)| summary_row(label, value))
                                .collect_view()}
                        </div>

                        <Show when=move || !has_workbook.get()>
                            <div class="notice">
                                <p>"This inspection was restored from a previous session. Select the original template again to generate the file."</p>
                                <input type="file" accept=".xlsx" on:change=on_attach />
                            </div>
                        </Show>

                        {move || error().map(|message| view! { <div class="error-message">{message}</div> })}

                        <div class="actions">
                            <button
                                class="btn btn-primary"
                                disabled=move || is_generating.get() || !has_workbook.get()
                                on:click=on_generate
                            >
                                {move || if is_generating.get() { "Generating..." } else { "Generate Excel File" }}
                            </button>
                        </div>
                    </div>
                </div>
            }
        >
            <div class="step-container">
                <div class="step-header">
                    <div class="done-icon">"✓"</div>
                    <h1 class="step-title">"Excel File Generated!"</h1>
                    <p class="step-subtitle">"Your inspection sheet has been downloaded"</p>
                </div>

                <div class="card">
                    <div class="filename">
                        <strong>"Filename: "</strong>
                        {move || file_name.get().unwrap_or_default()}
                    </div>
                    {move || local_error.get().map(|message| view! { <div class="error-message">{message}</div> })}
                    <div class="actions">
                        <button class="btn btn-primary" on:click=move |_| start_new_inspection(wizard)>
                            "Start New Inspection"
                        </button>
                    </div>
                </div>
            </div>
        </Show>
    }
}

fn apply_generate(wizard: WizardState) -> Result<pdi_sheet_common::GeneratedFile, GenerateError> {
    wizard
        .try_update(|w| w.generate())
        .unwrap_or(Err(GenerateError::Wizard(pdi_sheet_common::WizardError::NoSession)))
}
