//! プログレスバーコンポーネント

use leptos::prelude::*;

/// `progress` は (現在位置, 全件数)
#[component]
pub fn ProgressBar(progress: Memo<(usize, usize)>) -> impl IntoView {
    let percent = move || {
        let (current, total) = progress.get();
        if total == 0 {
            0.0
        } else {
            current as f32 / total as f32 * 100.0
        }
    };

    view! {
        <div class="progress-indicator">
            <span>
                {move || {
                    let (current, total) = progress.get();
                    format!("Question {} of {}", current, total)
                }}
            </span>
            <div class="progress-bar">
                <div class="progress-fill" style=move || format!("width: {}%", percent()) />
            </div>
        </div>
    }
}
