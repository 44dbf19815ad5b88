//! Standard library host.
//!
//! Only available when the `std` feature is enabled.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use super::{DisplayRequest, Host, UrlMethod};

/// Host printing traces to stdout, with an `Instant` clock and a xorshift64
/// random generator.
pub struct StdHost {
    /// Reference instant for GetTime
    epoch: Instant,
    state: u64,
}

impl StdHost {
    /// Create a host seeded from the current time.
    pub fn new() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x12345678_9abcdef0);
        Self::with_seed(seed)
    }

    /// Create with a specific seed (for testing).
    pub fn with_seed(seed: u64) -> Self {
        let seed = if seed == 0 { 0x12345678_9abcdef0 } else { seed };
        Self {
            epoch: Instant::now(),
            state: seed,
        }
    }
}

impl Default for StdHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for StdHost {
    fn trace(&mut self, message: &str) {
        println!("{}", message);
    }

    fn get_url(&mut self, url: &str, target: &str, method: UrlMethod) {
        tracing::info!(url, target, ?method, "navigation requested");
    }

    fn display(&mut self, request: DisplayRequest) {
        tracing::debug!(?request, "display request ignored");
    }

    fn time_millis(&mut self) -> f64 {
        self.epoch.elapsed().as_millis() as f64
    }

    fn random(&mut self) -> f64 {
        // xorshift64 algorithm
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;

        // Use the upper 53 bits for an even spread over [0, 1)
        let mantissa = x >> 11;
        (mantissa as f64) / ((1u64 << 53) as f64)
    }
}
