//! テンプレート書き出し

#[cfg(feature = "excel")]
pub mod sample;

#[cfg(feature = "excel")]
pub use sample::{sample_item_count, sample_template_bytes, SAMPLE_ITEMS, SAMPLE_SHEET_NAME};
