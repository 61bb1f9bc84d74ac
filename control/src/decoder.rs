//! Per-tick driver turning strip samples into host actions.

use crate::config::{Config, Function};
use crate::event::{EventSink, Key};
use crate::position;
use crate::queue::DeltaQueue;
use crate::snapshot::Snapshot;
use crate::taps::{Tap, Taps};

/// Decode touch strip activity into slides, taps and double taps.
///
/// `tick` is expected to run at a steady 20 ms cadence. Every tick follows
/// the same pipeline: locate the finger, track the touch and its movement,
/// classify releases, settle the smoothing queue and dispatch its oldest
/// change according to the configured function. A single tap mutes the
/// microphone, a double tap locks the workstation.
#[derive(Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Decoder {
    now: u32,
    previous: Option<usize>,
    taps: Taps,
    queue: DeltaQueue,
}

impl Decoder {
    pub fn tick(&mut self, snapshot: &Snapshot, config: Config, sink: &mut impl EventSink) {
        self.now = self.now.wrapping_add(1);

        let position = position::detect(&snapshot.channels);
        self.track(position, config);

        match self.taps.update(self.now) {
            Some(Tap::Single) => sink.key_event(Key::MicMute, 1),
            Some(Tap::Double) => sink.key_event(Key::LockWorkstation, 1),
            None => (),
        }

        self.queue.settle();
        self.dispatch(config, sink);
    }

    /// Follow the finger between ticks: touch transitions feed the tap
    /// machine, movement between two valid positions feeds the queue.
    fn track(&mut self, position: Option<usize>, config: Config) {
        match (self.previous, position) {
            (None, Some(_)) => self.taps.touch_started(self.now),
            (Some(_), None) => self.taps.touch_ended(),
            _ => (),
        }

        if let (Some(old), Some(new)) = (self.previous, position) {
            if old != new {
                self.taps.mark_moved();

                let mut change = old as i32 - new as i32;
                if config.flip {
                    change = -change;
                }
                self.queue.write(change * i32::from(config.scale));
            }
        }

        self.previous = position;
    }

    fn dispatch(&mut self, config: Config, sink: &mut impl EventSink) {
        let change = self.queue.take();

        match config.function {
            Function::Volume => {
                if change > 0 {
                    sink.key_event(Key::VolumeUp, change as u8);
                }
                if change < 0 {
                    sink.key_event(Key::VolumeDown, (-change) as u8);
                }
            }
            Function::Brightness => {
                if change > 0 {
                    sink.key_event(Key::BrightnessUp, change as u8);
                }
                if change < 0 {
                    sink.key_event(Key::BrightnessDown, (-change) as u8);
                }
            }
            Function::Scroll => sink.scroll(change as i8),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Action, Batch};
    use crate::snapshot::CHANNELS;

    const BASELINE: u16 = 100;

    fn touching(pad: usize) -> Snapshot {
        let mut channels = [BASELINE; CHANNELS];
        channels[pad] = 1000;
        Snapshot { channels }
    }

    fn released() -> Snapshot {
        Snapshot {
            channels: [BASELINE; CHANNELS],
        }
    }

    fn run(
        decoder: &mut Decoder,
        config: Config,
        snapshot: &Snapshot,
        ticks: u32,
        actions: &mut Vec<Action>,
    ) {
        for _ in 0..ticks {
            let mut batch = Batch::new();
            decoder.tick(snapshot, config, &mut batch);
            actions.extend_from_slice(batch.actions());
        }
    }

    fn key_total(actions: &[Action], wanted: Key) -> u32 {
        actions
            .iter()
            .filter_map(|action| match action {
                Action::Key(key, magnitude) if *key == wanted => {
                    Some(u32::from(*magnitude))
                }
                _ => None,
            })
            .sum()
    }

    fn slide(decoder: &mut Decoder, config: Config, pads: &[usize]) -> Vec<Action> {
        let mut actions = Vec::new();
        for pad in pads {
            run(decoder, config, &touching(*pad), 2, &mut actions);
        }
        run(decoder, config, &released(), 30, &mut actions);
        actions
    }

    #[test]
    fn when_a_short_touch_releases_it_mutes_the_microphone_once() {
        let mut decoder = Decoder::default();
        let config = Config::default();
        let mut actions = Vec::new();

        run(&mut decoder, config, &touching(3), 10, &mut actions);
        run(&mut decoder, config, &released(), 40, &mut actions);

        assert_eq!(actions, vec![Action::Key(Key::MicMute, 1)]);
    }

    #[test]
    fn when_two_quick_taps_land_it_locks_the_workstation_once() {
        let mut decoder = Decoder::default();
        let config = Config::default();
        let mut actions = Vec::new();

        run(&mut decoder, config, &touching(3), 5, &mut actions);
        run(&mut decoder, config, &released(), 10, &mut actions);
        run(&mut decoder, config, &touching(3), 5, &mut actions);
        run(&mut decoder, config, &released(), 60, &mut actions);

        assert_eq!(actions, vec![Action::Key(Key::LockWorkstation, 1)]);
    }

    #[test]
    fn when_the_touch_is_held_too_long_no_tap_is_reported() {
        let mut decoder = Decoder::default();
        let config = Config::default();
        let mut actions = Vec::new();

        run(&mut decoder, config, &touching(3), 25, &mut actions);
        run(&mut decoder, config, &released(), 60, &mut actions);

        assert!(actions.is_empty());
    }

    #[test]
    fn when_the_finger_slides_down_the_strip_it_raises_the_volume() {
        let mut decoder = Decoder::default();
        let actions = slide(&mut decoder, Config::default(), &[5, 4, 3, 2]);

        assert_eq!(key_total(&actions, Key::VolumeUp), 3);
        assert_eq!(key_total(&actions, Key::VolumeDown), 0);
        // Sliding disqualified the touch from being a tap.
        assert_eq!(key_total(&actions, Key::MicMute), 0);
    }

    #[test]
    fn when_the_axis_is_flipped_the_direction_reverses() {
        let mut decoder = Decoder::default();
        let config = Config {
            flip: true,
            ..Config::default()
        };
        let actions = slide(&mut decoder, config, &[5, 4, 3, 2]);

        assert_eq!(key_total(&actions, Key::VolumeUp), 0);
        assert_eq!(key_total(&actions, Key::VolumeDown), 3);
    }

    #[test]
    fn when_a_scale_is_configured_the_magnitude_multiplies() {
        let mut decoder = Decoder::default();
        let config = Config {
            scale: 2,
            ..Config::default()
        };
        let actions = slide(&mut decoder, config, &[5, 4, 3, 2]);

        assert_eq!(key_total(&actions, Key::VolumeUp), 6);
    }

    #[test]
    fn when_brightness_is_configured_slides_drive_brightness_keys() {
        let mut decoder = Decoder::default();
        let config = Config {
            function: Function::Brightness,
            ..Config::default()
        };
        let actions = slide(&mut decoder, config, &[2, 3, 4]);

        assert_eq!(key_total(&actions, Key::BrightnessDown), 2);
        assert_eq!(key_total(&actions, Key::BrightnessUp), 0);
    }

    #[test]
    fn when_scroll_is_configured_every_tick_reports_a_wheel_value() {
        let mut decoder = Decoder::default();
        let config = Config {
            function: Function::Scroll,
            ..Config::default()
        };
        let mut actions = Vec::new();

        run(&mut decoder, config, &released(), 3, &mut actions);
        assert_eq!(
            actions,
            vec![Action::Scroll(0), Action::Scroll(0), Action::Scroll(0)]
        );

        let actions = slide(&mut decoder, config, &[2, 3, 4]);
        let scrolled: i32 = actions
            .iter()
            .map(|action| match action {
                Action::Scroll(delta) => i32::from(*delta),
                Action::Key(..) => 0,
            })
            .sum();
        assert_eq!(scrolled, -2);
    }

    #[test]
    fn when_movement_oscillates_between_two_pads_nothing_is_reported() {
        let mut decoder = Decoder::default();
        let config = Config::default();
        let mut actions = Vec::new();

        // Finger on the boundary of pads 3 and 4, flickering every tick
        // and settling back on pad 3.
        for _ in 0..10 {
            run(&mut decoder, config, &touching(3), 1, &mut actions);
            run(&mut decoder, config, &touching(4), 1, &mut actions);
        }
        run(&mut decoder, config, &touching(3), 1, &mut actions);
        run(&mut decoder, config, &released(), 30, &mut actions);

        assert!(actions.is_empty(), "{actions:?}");
    }

    #[test]
    fn when_a_slide_starts_its_report_arrives_three_ticks_later() {
        let mut decoder = Decoder::default();
        let config = Config::default();
        let mut actions = Vec::new();

        run(&mut decoder, config, &touching(5), 1, &mut actions);
        run(&mut decoder, config, &touching(4), 1, &mut actions);
        assert!(actions.is_empty());

        run(&mut decoder, config, &touching(4), 2, &mut actions);
        assert!(actions.is_empty());

        run(&mut decoder, config, &touching(4), 1, &mut actions);
        assert_eq!(actions, vec![Action::Key(Key::VolumeUp, 1)]);
    }
}
