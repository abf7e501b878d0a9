//! Request timing.
//!
//! `Performance.now()` in the browser, a process-relative `Instant` natively.

/// Current high-resolution timestamp in milliseconds.
#[cfg(all(target_family = "wasm", target_os = "unknown"))]
pub fn now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

#[cfg(not(all(target_family = "wasm", target_os = "unknown")))]
pub fn now() -> f64 {
    use std::time::Instant;
    static START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();
    let start = START.get_or_init(Instant::now);
    start.elapsed().as_secs_f64() * 1000.0
}

/// Logs the elapsed time of one backend call when dropped, so early returns
/// through `?` are timed too.
pub struct TimingGuard {
    method: &'static str,
    path: String,
    start: f64,
}

impl TimingGuard {
    pub fn new(method: &'static str, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            start: now(),
        }
    }

    /// Milliseconds since the guard was created.
    pub fn elapsed_ms(&self) -> f64 {
        now() - self.start
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        tracing::debug!(
            method = self.method,
            path = %self.path,
            elapsed_ms = self.elapsed_ms(),
            "api call finished"
        );
    }
}
