//! 検査項目画面
//!
//! 1項目ずつ合格・不合格を記録する。不合格はメモ必須。

use crate::app::{apply, WizardState};
use crate::browser::confirm;
use crate::components::note_modal::NoteModal;
use crate::components::progress_bar::ProgressBar;
use leptos::prelude::*;

#[component]
pub fn InspectionStep(wizard: WizardState) -> impl IntoView {
    let current = Memo::new(move |_| wizard.with(|w| w.current_item().cloned()));
    let progress = Memo::new(move |_| wizard.with(|w| w.progress()));
    let is_first = move || progress.get().0 <= 1;
    let (show_note, set_show_note) = signal(false);

    let initial_notes = Signal::derive(move || {
        current.with(|item| item.as_ref().map(|i| i.notes.clone()).unwrap_or_default())
    });

    let on_pass = move |_| {
        let _ = apply(wizard, |w| w.pass());
    };

    let on_fail = move |_| set_show_note.set(true);

    let on_note_submit = move |note: String| {
        if apply(wizard, |w| w.fail(&note)).is_ok() {
            set_show_note.set(false);
        }
    };

    let on_note_close = move |_: ()| set_show_note.set(false);

    let on_fully_fail = move |_| {
        if confirm("Are you sure you want to fully fail the robot? This will mark all remaining items as failed.") {
            let _ = apply(wizard, |w| w.fully_fail());
        }
    };

    let on_previous = move |_| {
        let _ = apply(wizard, |w| w.previous());
    };

    view! {
        <div class="step-container">
            <ProgressBar progress=progress />

            {move || {
                current
                    .get()
                    .map(|item| {
                        view! {
                            <div class="question-card">
                                <div>
                                    <div class="question-number">{format!("Item {}", item.item_number)}</div>
                                    <div class="question-text">{item.description.clone()}</div>
                                </div>
                            </div>
                        }
                    })
            }}

            <div class="question-actions">
                <div class="pass-fail">
                    <button class="btn btn-success" on:click=on_pass>"✓ Pass"</button>
                    <button class="btn btn-danger" on:click=on_fail>"✗ Fail"</button>
                </div>

                <button class="btn btn-secondary" on:click=on_fully_fail>
                    "Fully Fail Robot"
                </button>

                <Show when=move || !is_first()>
                    <button class="btn btn-secondary" on:click=on_previous>
                        "← Previous Question"
                    </button>
                </Show>
            </div>

            <NoteModal
                is_open=show_note
                initial_notes=initial_notes
                on_submit=on_note_submit
                on_close=on_note_close
            />
        </div>
    }
}
