//! やり直しボタン

use crate::app::{start_over, WizardState};
use crate::browser::confirm;
use leptos::prelude::*;

#[component]
pub fn StartOver(wizard: WizardState) -> impl IntoView {
    let on_click = move |_| {
        if confirm("Are you sure you want to start over? All progress will be lost.") {
            start_over(wizard);
        }
    };

    view! {
        <div class="start-over">
            <button class="btn btn-secondary btn-small" on:click=on_click>
                "← Start Over"
            </button>
        </div>
    }
}
