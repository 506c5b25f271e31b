//! ブラウザAPIの薄いラッパー
//!
//! ファイル読み込み、ダウンロード、確認ダイアログ、コンソール出力。

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, File, HtmlAnchorElement, Url};

/// テンプレートとして受け付けるファイル名か
pub fn is_xlsx_name(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".xlsx")
}

/// ファイルの中身を読み込む
pub async fn read_file_bytes(file: &File) -> Result<Vec<u8>, String> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| format!("Failed to read {}: {:?}", file.name(), e))?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

/// バイト列を名前付きファイルとしてダウンロードさせる
pub fn download_bytes(bytes: &[u8], file_name: &str, mime_type: &str) -> Result<(), JsValue> {
    let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes));
    let options = BlobPropertyBag::new();
    options.set_type(mime_type);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("document is not available"))?;
    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();

    Url::revoke_object_url(&url)
}

/// 確認ダイアログ（使えない環境では false）
pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

pub fn log_error(message: &str) {
    web_sys::console::error_1(&JsValue::from_str(message));
}
