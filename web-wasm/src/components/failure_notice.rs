//! 描画エラー時の画面（ErrorBoundary の fallback）

use crate::app::{start_over, WizardState};
use leptos::prelude::*;

#[component]
pub fn FailureNotice(wizard: WizardState) -> impl IntoView {
    view! {
        <div class="step-container">
            <div class="card error-card">
                <h1>"Something went wrong"</h1>
                <p>"An unexpected error occurred. Start a new inspection to continue."</p>
                <button class="btn btn-primary" on:click=move |_| start_over(wizard)>
                    "Start New Inspection"
                </button>
            </div>
        </div>
    }
}
