//! 総合判定画面

use crate::app::{apply, WizardState};
use leptos::prelude::*;
use pdi_sheet_common::Verdict;

#[component]
pub fn BonusStep(wizard: WizardState) -> impl IntoView {
    let current = Memo::new(move |_| wizard.with(|w| w.data().and_then(|d| d.verdict)));

    let choose = move |verdict: Verdict| {
        let _ = apply(wizard, |w| w.choose_verdict(verdict));
    };

    let button_class = move |verdict: Verdict, base: &'static str| {
        if current.get() == Some(verdict) {
            format!("{} selected", base)
        } else {
            base.to_string()
        }
    };

    view! {
        <div class="step-container">
            <div class="step-header">
                <h1 class="step-title">"Final Question"</h1>
                <p class="step-subtitle">"Did the robot pass or fail overall?"</p>
            </div>

            <div class="card">
                <div class="pass-fail">
                    <button
                        class=move || button_class(Verdict::Pass, "btn btn-success btn-large")
                        on:click=move |_| choose(Verdict::Pass)
                    >
                        "✓ Pass"
                    </button>
                    <button
                        class=move || button_class(Verdict::Fail, "btn btn-danger btn-large")
                        on:click=move |_| choose(Verdict::Fail)
                    >
                        "✗ Fail"
                    </button>
                </div>
                <p class="text-muted">"This determines the Pass/Fail status in the output filename."</p>
            </div>
        </div>
    }
}
