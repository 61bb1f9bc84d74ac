//! Classify touch releases into taps and double taps.

use crate::log;

/// Maximum touch duration that still counts as a tap, in ticks.
const TAP_MAX_DURATION: u32 = 15; // 300 ms at the 20 ms cadence
/// Window in which a second tap turns the pair into a double tap, in ticks.
const DOUBLE_TAP_WINDOW: u32 = 20; // 400 ms

/// Outcome of the tap state machine for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tap {
    Single,
    Double,
}

/// Use this to classify touches over time.
///
/// The decoder feeds it touch transitions and movement; `update` turns
/// releases into taps and pairs of close releases into double taps. A tap
/// is only reported as single once the double tap window expired, so at
/// most one outcome leaves the machine per tick.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Taps {
    touching: bool,
    touch_start: u32,
    has_moved: bool,
    release_processed: bool,
    waiting_for_second: bool,
    last_release: u32,
}

impl Default for Taps {
    fn default() -> Self {
        Self {
            touching: false,
            touch_start: 0,
            has_moved: false,
            // There is no release to process before the first touch.
            release_processed: true,
            waiting_for_second: false,
            last_release: 0,
        }
    }
}

impl Taps {
    pub fn touch_started(&mut self, now: u32) {
        self.touching = true;
        self.touch_start = now;
        self.has_moved = false;
        self.release_processed = false;
    }

    pub fn touch_ended(&mut self) {
        self.touching = false;
    }

    /// Movement disqualifies the running touch from being a tap.
    pub fn mark_moved(&mut self) {
        self.has_moved = true;
    }

    /// Process the tick, classifying a fresh release and expiring an open
    /// double tap wait. Runs every tick so an expiring wait resolves even
    /// when the strip stays untouched.
    pub fn update(&mut self, now: u32) -> Option<Tap> {
        let mut tap = None;

        if !self.touching && !self.release_processed {
            self.release_processed = true;
            let duration = now.wrapping_sub(self.touch_start);

            if duration > 0 && duration < TAP_MAX_DURATION && !self.has_moved {
                if self.waiting_for_second
                    && now.wrapping_sub(self.last_release) < DOUBLE_TAP_WINDOW
                {
                    log::info!("Detected double tap");
                    tap = Some(Tap::Double);
                    self.waiting_for_second = false;
                } else {
                    self.waiting_for_second = true;
                    self.last_release = now;
                }
            }
        }

        if self.waiting_for_second
            && now.wrapping_sub(self.last_release) >= DOUBLE_TAP_WINDOW
        {
            log::info!("Detected single tap");
            tap = Some(Tap::Single);
            self.waiting_for_second = false;
        }

        tap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tap(taps: &mut Taps, start: u32, duration: u32) -> Option<Tap> {
        taps.touch_started(start);
        for now in start..start + duration {
            assert_eq!(taps.update(now), None);
        }
        taps.touch_ended();
        taps.update(start + duration)
    }

    #[test]
    fn when_a_short_touch_releases_it_reports_single_after_the_window() {
        let mut taps = Taps::default();

        assert_eq!(tap(&mut taps, 1, 5), None);

        for now in 7..26 {
            assert_eq!(taps.update(now), None, "tick {now}");
        }
        assert_eq!(taps.update(26), Some(Tap::Single));
        assert_eq!(taps.update(27), None);
    }

    #[test]
    fn when_a_second_tap_lands_within_the_window_it_reports_double() {
        let mut taps = Taps::default();

        assert_eq!(tap(&mut taps, 1, 5), None);
        assert_eq!(tap(&mut taps, 16, 5), Some(Tap::Double));

        // The wait was consumed, nothing resolves later.
        for now in 22..80 {
            assert_eq!(taps.update(now), None, "tick {now}");
        }
    }

    #[test]
    fn when_the_touch_lasts_too_long_it_is_not_a_tap() {
        let mut taps = Taps::default();

        assert_eq!(tap(&mut taps, 1, 20), None);
        for now in 22..80 {
            assert_eq!(taps.update(now), None, "tick {now}");
        }
    }

    #[test]
    fn when_the_finger_moved_it_is_not_a_tap() {
        let mut taps = Taps::default();

        taps.touch_started(1);
        taps.update(1);
        taps.mark_moved();
        taps.update(2);
        taps.touch_ended();

        for now in 3..60 {
            assert_eq!(taps.update(now), None, "tick {now}");
        }
    }

    #[test]
    fn when_the_second_tap_lands_on_the_window_edge_it_restarts_the_wait() {
        let mut taps = Taps::default();

        assert_eq!(tap(&mut taps, 1, 5), None);
        // Release at tick 26, exactly DOUBLE_TAP_WINDOW after tick 6.
        assert_eq!(tap(&mut taps, 21, 5), None);

        // Only the restarted wait resolves, once.
        let mut singles = 0;
        for now in 27..80 {
            if taps.update(now) == Some(Tap::Single) {
                singles += 1;
            }
        }
        assert_eq!(singles, 1);
    }
}
