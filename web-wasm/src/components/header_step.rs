//! ヘッダー入力画面

use crate::app::{apply, WizardState};
use leptos::prelude::*;
use pdi_sheet_common::validate::FieldErrors;
use pdi_sheet_common::WizardError;

#[component]
pub fn HeaderStep(wizard: WizardState) -> impl IntoView {
    let fields = wizard.with_untracked(|w| {
        w.data()
            .map(|d| d.header_info.fields.clone())
            .unwrap_or_default()
    });
    let values = RwSignal::new(fields.iter().map(|f| f.value.clone()).collect::<Vec<_>>());
    let errors = RwSignal::new(FieldErrors::default());

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let input = values.get_untracked();
        match apply(wizard, |w| w.submit_header(&input)) {
            Ok(()) => {}
            Err(WizardError::Header(field_errors)) => errors.set(field_errors),
            Err(_) => {}
        }
    };

    let rows = fields
        .into_iter()
        .enumerate()
        .map(|(index, field)| {
            let id = format!("header-{}", index);
            let placeholder = format!("Enter {}", field.label.to_lowercase());
            let label = field.label.clone();
            let error_label = field.label.clone();

            view! {
                <div class="form-group">
                    <label for=id.clone()>
                        {field.label.clone()}
                        {field.is_required.then(|| view! { <span class="required">" *"</span> })}
                    </label>
                    <input
                        type="text"
                        id=id
                        placeholder=placeholder
                        prop:value=move || values.with(|v| v.get(index).cloned().unwrap_or_default())
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            values.update(|v| {
                                if let Some(slot) = v.get_mut(index) {
                                    *slot = value;
                                }
                            });
                            errors.update(|e| e.remove(&label));
                        }
                    />
                    {move || {
                        errors.with(|e| {
                            e.get(&error_label)
                                .map(|message| view! { <p class="field-error">{message.to_string()}</p> })
                        })
                    }}
                </div>
            }
        })
        .collect_view();

    view! {
        <div class="step-container">
            <div class="step-header">
                <h1 class="step-title">"Fill Header Information"</h1>
                <p class="step-subtitle">"Please fill in the header information from the inspection sheet"</p>
            </div>

            <form class="card" on:submit=on_submit>
                <div class="header-grid">{rows}</div>
                <div class="actions">
                    <button type="submit" class="btn btn-primary">
                        "Continue to Inspection"
                    </button>
                </div>
            </form>
        </div>
    }
}
