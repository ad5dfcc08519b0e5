//! `localStorage` and `window.location` behind the store's ports.

use company_store::{LocationError, LocationQuery, SelectionStorage, StorageError};
use gloo::storage::{LocalStorage, Storage};
use gloo::utils::errors::JsError;
use gloo::utils::window;
use wasm_bindgen::JsValue;

pub(crate) fn js_message(value: &JsValue) -> String {
    match JsError::try_from(value.clone()) {
        Ok(err) => err.to_string(),
        Err(_) => value.as_string().unwrap_or_else(|| format!("{value:?}")),
    }
}

/// `LocalStorage::raw` panics when storage is disabled, so check availability first.
fn local_storage() -> Result<web_sys::Storage, StorageError> {
    match window().local_storage() {
        Ok(Some(_)) => Ok(LocalStorage::raw()),
        Ok(None) => Err(StorageError::Unavailable("localStorage disabled".into())),
        Err(e) => Err(StorageError::Unavailable(js_message(&e))),
    }
}

/// Raw string access, bypassing gloo's JSON codec: the token is stored bare
/// and the selection record is already serialized by the store.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStorage;

impl SelectionStorage for BrowserStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        local_storage()?
            .get_item(key)
            .map_err(|e| StorageError::Unavailable(js_message(&e)))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        local_storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Unavailable(js_message(&e)))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        local_storage()?;
        LocalStorage::delete(key);
        Ok(())
    }
}

/// Auth token persisted by the login form, raw (not JSON encoded).
pub fn read_token(key: &str) -> Option<String> {
    match BrowserStorage.read(key) {
        Ok(token) => token.filter(|t| !t.is_empty()),
        Err(err) => {
            tracing::debug!(error = %err, "auth token unreadable");
            None
        }
    }
}

pub fn store_token(key: &str, token: &str) {
    if let Err(err) = BrowserStorage.write(key, token) {
        tracing::warn!(error = %err, "could not persist auth token");
    }
}

pub fn clear_token(key: &str) {
    if let Err(err) = BrowserStorage.remove(key) {
        tracing::warn!(error = %err, "could not clear auth token");
    }
}

fn current_url() -> Result<web_sys::Url, LocationError> {
    let href = window()
        .location()
        .href()
        .map_err(|e| LocationError::Parse(js_message(&e)))?;
    web_sys::Url::new(&href).map_err(|e| LocationError::Parse(js_message(&e)))
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserLocation;

impl LocationQuery for BrowserLocation {
    fn query_param(&self, name: &str) -> Result<Option<String>, LocationError> {
        Ok(current_url()?.search_params().get(name))
    }

    fn replace_query_param(&self, name: &str, value: Option<&str>) -> Result<(), LocationError> {
        let url = current_url()?;
        // Live view: edits are reflected in `url.href()`.
        let params = url.search_params();
        match value {
            Some(value) => params.set(name, value),
            None => params.delete(name),
        }

        let history = window()
            .history()
            .map_err(|e| LocationError::History(js_message(&e)))?;
        history
            .replace_state_with_url(&JsValue::NULL, "", Some(&url.href()))
            .map_err(|e| LocationError::History(js_message(&e)))
    }
}
