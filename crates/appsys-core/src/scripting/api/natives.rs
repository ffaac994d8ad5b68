//! # Natives API
//!
//! Host services available to every app.
//!
//! ## Responsibilities
//! - **Timing**: `delay(ms)`, `lv_delay_ms(ms)` block the calling thread
//! - **Output**: script `print` and `debug` are emitted as `tracing` events
//!   under the `script` target

use rhai::{Engine, INT};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

pub fn register(engine: &mut Engine) {
    engine.register_fn("delay", sleep_ms);
    engine.register_fn("lv_delay_ms", sleep_ms);

    engine.on_print(|text| info!(target: "script", "{text}"));
    engine.on_debug(|text, source, pos| {
        debug!(target: "script", source = source.unwrap_or(""), %pos, "{text}")
    });
}

/// Negative durations do not sleep.
fn sleep_ms(ms: INT) {
    if ms > 0 {
        thread::sleep(Duration::from_millis(ms as u64));
    }
}
