//! `tracing` output routed to the devtools console.

use std::cell::RefCell;
use std::io::{self, Write};

use tracing::{Level, Metadata, warn};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

thread_local! {
	static FILTER: RefCell<Option<reload::Handle<EnvFilter, Registry>>> = const { RefCell::new(None) };
}

/// Installs a global fmt subscriber writing through `console.*`.
///
/// Falls back to `info` when `directive` does not parse. A second call only
/// replaces the filter, see [`set_log_level`].
pub fn init_logging(directive: &str) {
	if FILTER.with(|f| f.borrow().is_some()) {
		set_log_level(directive);
		return;
	}

	let (filter, handle) = reload::Layer::new(parse_filter(directive));
	let installed = tracing_subscriber::registry()
		.with(filter)
		.with(
			fmt::layer()
				.with_writer(ConsoleMakeWriter)
				.with_ansi(false)
				.without_time()
				.with_target(true)
				.compact(),
		)
		.try_init();
	if installed.is_ok() {
		FILTER.with(|f| *f.borrow_mut() = Some(handle));
	}
}

/// Swaps the active filter, e.g. once `RelayConfig::log_level` has been loaded.
pub fn set_log_level(directive: &str) {
	FILTER.with(|f| {
		if let Some(handle) = f.borrow().as_ref() {
			if let Err(err) = handle.reload(parse_filter(directive)) {
				warn!(target = "selrelay", error = %err, "failed to change log level");
			}
		}
	});
}

fn parse_filter(directive: &str) -> EnvFilter {
	EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"))
}

struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
	type Writer = ConsoleWriter;

	fn make_writer(&'a self) -> Self::Writer {
		ConsoleWriter::new(Level::INFO)
	}

	fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
		ConsoleWriter::new(*meta.level())
	}
}

/// Buffers one formatted event and emits it on drop.
struct ConsoleWriter {
	level: Level,
	buf: Vec<u8>,
}

impl ConsoleWriter {
	fn new(level: Level) -> Self {
		Self { level, buf: Vec::new() }
	}
}

impl Write for ConsoleWriter {
	fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
		self.buf.extend_from_slice(bytes);
		Ok(bytes.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

impl Drop for ConsoleWriter {
	fn drop(&mut self) {
		if self.buf.is_empty() {
			return;
		}
		let line = String::from_utf8_lossy(&self.buf);
		let line = wasm_bindgen::JsValue::from_str(line.trim_end());
		if self.level == Level::ERROR {
			web_sys::console::error_1(&line);
		} else if self.level == Level::WARN {
			web_sys::console::warn_1(&line);
		} else if self.level == Level::INFO {
			web_sys::console::info_1(&line);
		} else {
			web_sys::console::debug_1(&line);
		}
	}
}
