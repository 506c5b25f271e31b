//! 画面コンポーネント（ステップごとに1つ）

pub mod bonus_step;
pub mod failure_notice;
pub mod generate_step;
pub mod header;
pub mod header_step;
pub mod initials_step;
pub mod inspection_step;
pub mod note_modal;
pub mod progress_bar;
pub mod review_step;
pub mod start_over;
pub mod upload_step;
