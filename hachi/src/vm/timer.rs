use std::time::Instant;

use super::Chip8;
use crate::platform::Platform;

impl<P: Platform> Chip8<P> {
    /// Apply every whole timer period elapsed up to `now`. The first call
    /// only starts the clock.
    ///
    /// Each period decrements both timers while non-zero and beeps once per
    /// sound timer decrement. Leftover time carries into the next call.
    pub fn tick_timers(&mut self, now: Instant) {
        let interval = self.state.timer_interval;
        let mut last = *self.last_timer_tick.get_or_insert(now);
        if interval.is_zero() {
            return;
        }

        while now.saturating_duration_since(last) >= interval {
            if self.state.delay_timer > 0 {
                self.state.delay_timer -= 1;
            }
            if self.state.sound_timer > 0 {
                self.state.sound_timer -= 1;
                self.platform.on_beep();
            }
            last += interval;
        }

        self.last_timer_tick = Some(last);
    }
}
