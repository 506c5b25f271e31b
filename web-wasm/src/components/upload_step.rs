//! アップロード画面
//!
//! ドラッグ&ドロップまたはクリックでテンプレートを選ぶ。
//! 前回の保存データがあれば再開・削除を選べる。

use crate::app::{apply, WizardState};
use crate::browser::{is_xlsx_name, log_error, read_file_bytes};
use crate::storage::LocalStore;
use leptos::prelude::*;
use leptos::task::spawn_local;
use pdi_sheet_common::{parse_xlsx, SessionStore, Wizard};
use web_sys::{DragEvent, File, HtmlInputElement};

#[component]
pub fn UploadStep(wizard: WizardState) -> impl IntoView {
    let (is_dragover, set_is_dragover) = signal(false);
    let (is_loading, set_is_loading) = signal(false);
    let (error, set_error) = signal(None::<String>);
    let saved = RwSignal::new(LocalStore.load());
    let input_ref: NodeRef<leptos::html::Input> = NodeRef::new();

    let handle_file = move |file: File| {
        if is_loading.get_untracked() {
            return;
        }
        if !is_xlsx_name(&file.name()) {
            set_error.set(Some("Please upload a valid Excel file (.xlsx)".to_string()));
            return;
        }

        set_is_loading.set(true);
        set_error.set(None);
        spawn_local(async move {
            match read_file_bytes(&file).await {
                Ok(bytes) => {
                    let parsed = parse_xlsx(&bytes);
                    if apply(wizard, |w| w.load(parsed)).is_ok() {
                        // 失敗時は upload に留まりメッセージが入る
                        if let Some(message) = wizard.with_untracked(|w| w.error().map(str::to_string)) {
                            set_error.set(Some(message));
                        }
                    }
                }
                Err(message) => {
                    log_error(&message);
                    set_error.set(Some(message));
                }
            }
            set_is_loading.set(false);
        });
    };

    let on_drop = move |ev: DragEvent| {
        ev.prevent_default();
        set_is_dragover.set(false);
        let file = ev.data_transfer().and_then(|dt| dt.files()).and_then(|files| files.get(0));
        if let Some(file) = file {
            handle_file(file);
        }
    };

    let on_dragover = move |ev: DragEvent| {
        ev.prevent_default();
        set_is_dragover.set(true);
    };

    let on_dragleave = move |_: DragEvent| {
        set_is_dragover.set(false);
    };

    let on_click = move |_| {
        if let Some(input) = input_ref.get() {
            input.click();
        }
    };

    let on_change = move |ev| {
        let input: HtmlInputElement = event_target(&ev);
        if let Some(file) = input.files().and_then(|files| files.get(0)) {
            handle_file(file);
        }
        // 同じファイルを選び直せるように
        input.set_value("");
    };

    let on_resume = move |_| {
        if let Some(snapshot) = saved.try_update(Option::take).flatten() {
            wizard.set(Wizard::restore(snapshot));
        }
    };

    let on_clear_saved = move |_| {
        if let Err(e) = LocalStore.clear() {
            log_error(&e.to_string());
        }
        saved.set(None);
    };

    view! {
        <div class="step-container">
            <div class="step-header">
                <h1 class="step-title">"PDI Inspection Sheet"</h1>
                <p class="step-subtitle">"Upload the blank Excel template for the correct revision"</p>
            </div>

            <Show when=move || saved.with(Option::is_some)>
                <div class="notice">
                    <p>
                        "⚠️ There is saved inspection data from a previous session"
                        {move || saved.with(|s| s.as_ref().map(|s| format!(" (step: {}).", s.step)))}
                    </p>
                    <div class="notice-actions">
                        <button class="btn btn-primary btn-small" on:click=on_resume>
                            "Resume"
                        </button>
                        <button class="btn btn-secondary btn-small" on:click=on_clear_saved>
                            "Clear Saved Data"
                        </button>
                    </div>
                </div>
            </Show>

            <div
                class=move || {
                    let mut classes = vec!["upload-area"];
                    if is_dragover.get() {
                        classes.push("dragover");
                    }
                    if is_loading.get() {
                        classes.push("disabled");
                    }
                    classes.join(" ")
                }
                on:drop=on_drop
                on:dragover=on_dragover
                on:dragleave=on_dragleave
                on:click=on_click
            >
                <Show
                    when=move || is_loading.get()
                    fallback=|| view! {
                        <div class="upload-icon">"📄"</div>
                        <p>"Drag and drop your Excel file here"</p>
                        <p class="text-muted">"or click to browse"</p>
                        <p class="text-muted">"Supported format: .xlsx"</p>
                    }
                >
                    <div class="upload-icon">"⏳"</div>
                    <p>"Parsing Excel file..."</p>
                </Show>
            </div>

            <input
                node_ref=input_ref
                type="file"
                accept=".xlsx"
                class="hidden"
                disabled=move || is_loading.get()
                on:change=on_change
            />

            {move || error.get().map(|message| view! { <div class="error-message">{message}</div> })}
        </div>
    }
}
