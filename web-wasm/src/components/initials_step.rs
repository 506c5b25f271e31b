//! イニシャル入力画面

use crate::app::{apply, WizardState};
use leptos::prelude::*;
use pdi_sheet_common::WizardError;

#[component]
pub fn InitialsStep(wizard: WizardState) -> impl IntoView {
    let initial = wizard.with_untracked(|w| {
        w.data().map(|d| d.inspector_initials.clone()).unwrap_or_default()
    });
    let (initials, set_initials) = signal(initial);
    let (error, set_error) = signal(None::<String>);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let input = initials.get_untracked();
        if let Err(WizardError::Initials(e)) = apply(wizard, |w| w.submit_initials(&input)) {
            set_error.set(Some(e.to_string()));
        }
    };

    view! {
        <div class="step-container">
            <div class="step-header">
                <h1 class="step-title">"Enter Your Initials"</h1>
                <p class="step-subtitle">"Please enter your inspector initials"</p>
            </div>

            <form class="card" on:submit=on_submit>
                <div class="form-group">
                    <label for="initials">
                        "Inspector Initials"
                        <span class="required">" *"</span>
                    </label>
                    <input
                        type="text"
                        id="initials"
                        class="initials-input"
                        maxlength="5"
                        placeholder="e.g., JD"
                        prop:value=move || initials.get()
                        on:input=move |ev| {
                            set_initials.set(event_target_value(&ev).to_uppercase());
                            set_error.set(None);
                        }
                    />
                    {move || error.get().map(|message| view! { <p class="field-error">{message}</p> })}
                </div>

                <div class="actions">
                    <button type="submit" class="btn btn-primary">"Continue"</button>
                </div>
            </form>
        </div>
    }
}
