//! レビュー画面

use crate::app::{apply, WizardState};
use leptos::prelude::*;
use pdi_sheet_common::ItemStatus;

#[component]
pub fn ReviewStep(wizard: WizardState) -> impl IntoView {
    let summary = Memo::new(move |_| wizard.with(|w| w.summary()));
    let items = Memo::new(move |_| {
        wizard.with(|w| w.data().map(|d| d.items.clone()).unwrap_or_default())
    });

    let on_continue = move |_| {
        let _ = apply(wizard, |w| w.finish_review());
    };

    view! {
        <div class="step-container">
            <div class="step-header">
                <h1 class="step-title">"Review Inspection"</h1>
                <p class="step-subtitle">"Review all inspection items before finalizing"</p>
            </div>

            <div class="card tally">
                <div class="tally-pass">
                    <div class="tally-count">{move || summary.get().passed}</div>
                    <div class="text-muted">"Passed"</div>
                </div>
                <div class="tally-fail">
                    <div class="tally-count">{move || summary.get().failed}</div>
                    <div class="text-muted">"Failed"</div>
                </div>
                <Show when=move || { summary.get().pending > 0 }>
                    <div class="tally-pending">
                        <div class="tally-count">{move || summary.get().pending}</div>
                        <div class="text-muted">"Pending"</div>
                    </div>
                </Show>
            </div>

            <div class="review-list">
                <For
                    each=move || items.get()
                    key=|item| item.id.clone()
                    let:item
                >
                    {
                        let id = item.id.clone();
                        let status = item.status.as_str();
                        let notes = (item.status == ItemStatus::Fail && !item.notes.is_empty())
                            .then(|| item.notes.clone());
                        view! {
                            <div class=format!("review-item {}", status)>
                                <div class="review-item-header">
                                    <div>
                                        <span class="review-item-number">
                                            {format!("Item {}: ", item.item_number)}
                                        </span>
                                        <span>{item.description.clone()}</span>
                                    </div>
                                    <span class=format!("review-status-badge {}", status)>
                                        {item.status.label()}
                                    </span>
                                </div>
                                {notes.map(|notes| view! {
                                    <div class="review-item-notes">
                                        <strong>"Notes: "</strong>
                                        {notes}
                                    </div>
                                })}
                                <button
                                    class="btn btn-secondary btn-small"
                                    on:click=move |_| {
                                        let _ = apply(wizard, |w| w.edit_item(&id));
                                    }
                                >
                                    "Edit"
                                </button>
                            </div>
                        }
                    }
                </For>
            </div>

            <div class="actions">
                <button class="btn btn-primary" on:click=on_continue>
                    "Continue to Initials"
                </button>
            </div>
        </div>
    }
}
