//! 不合格メモ入力モーダル

use leptos::prelude::*;
use pdi_sheet_common::validate::validate_failure_note;

#[component]
pub fn NoteModal<FS, FC>(
    is_open: ReadSignal<bool>,
    initial_notes: Signal<String>,
    on_submit: FS,
    on_close: FC,
) -> impl IntoView
where
    FS: Fn(String) + 'static + Clone + Send + Sync,
    FC: Fn(()) + 'static + Clone + Send + Sync,
{
    let (notes, set_notes) = signal(String::new());
    let (error, set_error) = signal(None::<String>);

    // 開くたびに現在のメモで初期化
    Effect::new(move |_| {
        if is_open.get() {
            set_notes.set(initial_notes.get_untracked());
            set_error.set(None);
        }
    });

    let submit = {
        let on_submit = on_submit.clone();
        move |_| match validate_failure_note(&notes.get_untracked()) {
            Ok(note) => {
                set_notes.set(String::new());
                on_submit(note);
            }
            Err(e) => set_error.set(Some(e.to_string())),
        }
    };

    let close = move |_| {
        set_notes.set(String::new());
        set_error.set(None);
        on_close(());
    };

    view! {
        <Show when=move || is_open.get()>
            <div class="modal-overlay" on:click=close.clone()>
                <div class="modal-content" on:click=|ev| ev.stop_propagation()>
                    <h2 class="step-title">"Add Failure Note"</h2>
                    <p class="text-muted">"Please describe the issue that caused this item to fail:"</p>

                    <textarea
                        class="textarea"
                        rows="6"
                        placeholder="Enter details about the failure..."
                        autofocus=true
                        prop:value=move || notes.get()
                        on:input=move |ev| {
                            set_notes.set(event_target_value(&ev));
                            set_error.set(None);
                        }
                    />

                    {move || error.get().map(|message| view! { <p class="field-error">{message}</p> })}

                    <div class="modal-actions">
                        <button class="btn btn-secondary" on:click=close.clone()>
                            "Cancel"
                        </button>
                        <button class="btn btn-danger" on:click=submit.clone()>
                            "Submit"
                        </button>
                    </div>
                </div>
            </div>
        </Show>
    }
}
