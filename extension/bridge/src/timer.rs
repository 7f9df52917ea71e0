use std::time::Duration;

use async_trait::async_trait;
use selrelay::Timer;
use wasm_bindgen_futures::JsFuture;

use crate::chrome::set_timeout;

/// [`Timer`] over the global `setTimeout`; works in windows and service workers.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsTimer;

#[async_trait(?Send)]
impl Timer for JsTimer {
	async fn sleep(&self, duration: Duration) {
		sleep_ms(duration.as_millis().min(i32::MAX as u128) as i32).await;
	}
}

async fn sleep_ms(ms: i32) {
	let promise = js_sys::Promise::new(&mut |resolve, _reject| {
		let _ = set_timeout(&resolve, ms);
	});
	let _ = JsFuture::from(promise).await;
}
