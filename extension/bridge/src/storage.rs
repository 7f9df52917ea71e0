use async_trait::async_trait;
use js_sys::{Object, Reflect};
use selrelay::{PlatformError, Storage};
use serde_json::Value;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

use crate::chrome::{storage_local_get, storage_local_remove, storage_local_set};
use crate::{from_js, js_error, to_js};

/// [`Storage`] over `chrome.storage.local`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromeStorage;

#[async_trait(?Send)]
impl Storage for ChromeStorage {
	async fn get(&self, key: &str) -> Result<Option<Value>, PlatformError> {
		let key = JsValue::from_str(key);
		let items = JsFuture::from(storage_local_get(&key).map_err(js_error)?)
			.await
			.map_err(js_error)?;
		let value = Reflect::get(&items, &key).map_err(js_error)?;
		if value.is_undefined() || value.is_null() {
			return Ok(None);
		}
		from_js(value).map(Some)
	}

	async fn set(&self, key: &str, value: Value) -> Result<(), PlatformError> {
		let items = Object::new();
		Reflect::set(&items, &JsValue::from_str(key), &to_js(&value)?).map_err(js_error)?;
		JsFuture::from(storage_local_set(&items).map_err(js_error)?)
			.await
			.map_err(js_error)?;
		Ok(())
	}

	async fn remove(&self, key: &str) -> Result<(), PlatformError> {
		JsFuture::from(storage_local_remove(&JsValue::from_str(key)).map_err(js_error)?)
			.await
			.map_err(js_error)?;
		Ok(())
	}
}
