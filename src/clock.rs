//! Millisecond clock from the embassy time driver.

use embassy_time::Instant;
use stick_core::Clock;

/// [`Clock`] reading the uptime counter, truncated to a wrapping `u32`.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }
}
