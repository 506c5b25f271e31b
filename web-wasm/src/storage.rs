//! ブラウザのlocalStorageへのセッション保存

use gloo::storage::{LocalStorage, Storage};
use pdi_sheet_common::{decode_snapshot, Error, Result, SessionSnapshot, SessionStore, STORAGE_KEY};

fn storage_err(e: wasm_bindgen::JsValue) -> Error {
    Error::Storage(format!("{:?}", e))
}

/// localStorage の `inspection-wizard-data` に保存する
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

impl SessionStore for LocalStore {
    fn load(&self) -> Option<SessionSnapshot> {
        let raw = LocalStorage::raw().get_item(STORAGE_KEY).ok().flatten()?;
        decode_snapshot(&raw)
    }

    fn save(&mut self, snapshot: &SessionSnapshot) -> Result<()> {
        LocalStorage::raw()
            .set_item(STORAGE_KEY, &snapshot.to_json()?)
            .map_err(storage_err)
    }

    fn clear(&mut self) -> Result<()> {
        LocalStorage::raw().remove_item(STORAGE_KEY).map_err(storage_err)
    }
}
