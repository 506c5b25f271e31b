//! メインアプリケーションコンポーネント

use crate::browser::log_error;
use crate::components::{
    bonus_step::BonusStep, failure_notice::FailureNotice, generate_step::GenerateStep,
    header::Header, header_step::HeaderStep, initials_step::InitialsStep,
    inspection_step::InspectionStep, review_step::ReviewStep, start_over::StartOver,
    upload_step::UploadStep,
};
use crate::storage::LocalStore;
use leptos::prelude::*;
use pdi_sheet_common::{SessionStore, Wizard, WizardError, WizardStep, XlsxWorkbook};

/// 画面全体で共有するウィザード
pub type WizardState = RwSignal<Wizard<XlsxWorkbook>>;

/// ウィザード操作を実行する
///
/// 入力エラー以外（ステップ違いなど）はコンソールにも出す。
pub fn apply<T>(
    wizard: WizardState,
    action: impl FnOnce(&mut Wizard<XlsxWorkbook>) -> Result<T, WizardError>,
) -> Result<T, WizardError> {
    let result = wizard.try_update(action).unwrap_or(Err(WizardError::NoSession));
    if let Err(e) = &result {
        if !matches!(
            e,
            WizardError::Header(_) | WizardError::Initials(_) | WizardError::Note(_)
        ) {
            log_error(&e.to_string());
        }
    }
    result
}

/// 全状態と保存データを破棄して upload へ
pub fn start_over(wizard: WizardState) {
    wizard.update(|w| w.reset());
    clear_saved_session();
}

/// 生成完了後に次の検査を始める
pub fn start_new_inspection(wizard: WizardState) {
    wizard.update(|w| w.start_new());
    clear_saved_session();
}

fn clear_saved_session() {
    if let Err(e) = LocalStore.clear() {
        log_error(&e.to_string());
    }
}

/// 現在のステップの画面。描画できない状態はエラーにして境界で受ける
fn step_view(wizard: WizardState, step: WizardStep, has_data: bool) -> Result<AnyView, WizardError> {
    let view = match step {
        WizardStep::Upload => view! { <UploadStep wizard=wizard /> }.into_any(),
        _ if !has_data => {
            log_error(&format!("No inspection data for step '{}'", step));
            return Err(WizardError::NoSession);
        }
        WizardStep::Header => view! { <HeaderStep wizard=wizard /> }.into_any(),
        WizardStep::Inspection => view! { <InspectionStep wizard=wizard /> }.into_any(),
        WizardStep::Review => view! { <ReviewStep wizard=wizard /> }.into_any(),
        WizardStep::Initials => view! { <InitialsStep wizard=wizard /> }.into_any(),
        WizardStep::Bonus => view! { <BonusStep wizard=wizard /> }.into_any(),
        WizardStep::Generate => view! { <GenerateStep wizard=wizard /> }.into_any(),
    };
    Ok(view)
}

#[component]
pub fn App() -> impl IntoView {
    let wizard: WizardState = RwSignal::new(Wizard::new());

    // 変更のたびに保存（完了後は保存データを消す）
    Effect::new(move |_| {
        let (completed, snapshot) = wizard.with(|w| (w.is_completed(), w.snapshot()));
        let mut store = LocalStore;
        let result = match snapshot {
            _ if completed => store.clear(),
            Some(snapshot) => store.save(&snapshot),
            None => Ok(()),
        };
        if let Err(e) = result {
            log_error(&format!("Failed to save session: {}", e));
        }
    });

    let step = Memo::new(move |_| wizard.with(|w| w.step()));
    let has_data = Memo::new(move |_| wizard.with(|w| w.data().is_some()));

    view! {
        <div class="container">
            <Header />

            <Show when=move || step.get() != WizardStep::Upload>
                <StartOver wizard=wizard />
            </Show>

            <ErrorBoundary fallback=move |_| view! { <FailureNotice wizard=wizard /> }>
                {move || step_view(wizard, step.get(), has_data.get())}
            </ErrorBoundary>
        </div>
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    /// データなしで upload 以外のステップはエラーになる
    #[wasm_bindgen_test]
    fn test_step_without_data_is_error() {
        let wizard: WizardState = RwSignal::new(Wizard::new());
        assert!(matches!(
            step_view(wizard, WizardStep::Review, false),
            Err(WizardError::NoSession)
        ));
        assert!(step_view(wizard, WizardStep::Upload, false).is_ok());
    }
}
