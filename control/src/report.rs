//! Encoding of decoded actions into 4 byte wire reports.

use crate::event::{EventSink, Key};

/// Left GUI bit of the keyboard modifier byte.
const MODIFIER_LEFT_GUI: u8 = 0x08;
/// Key code of the `L` key, completing Win+L.
const KEY_CODE_L: u8 = 0x0F;

/// One wire report, as transmitted to the host.
///
/// The layout is fixed by the report descriptor: consumer key flags,
/// scroll wheel, keyboard modifiers, keyboard key code.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Report {
    pub consumer: u8,
    pub wheel: i8,
    pub modifiers: u8,
    pub keycode: u8,
}

impl Report {
    #[must_use]
    pub fn to_bytes(self) -> [u8; 4] {
        [self.consumer, self.wheel as u8, self.modifiers, self.keycode]
    }
}

/// Pace key events into alternating key down and key up reports.
///
/// A single report cannot express that a key was pressed and released
/// again, so every unit of a key event costs two transmissions. The
/// encoder counts the remaining halves; the transport asks for the next
/// report whenever the previous transmission completed. Scroll is not
/// phased, its value rides along in exactly one report.
#[derive(Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Encoder {
    key: Option<Key>,
    remaining: u16,
    wheel: i8,
    wheel_pending: bool,
}

impl EventSink for Encoder {
    fn key_event(&mut self, key: Key, magnitude: u8) {
        if magnitude == 0 {
            return;
        }
        self.key = Some(key);
        // One transmission for key down and one for key up, per unit.
        self.remaining = u16::from(magnitude) * 2;
    }

    fn scroll(&mut self, delta: i8) {
        self.key = None;
        self.remaining = 0;
        self.wheel = delta;
        self.wheel_pending = true;
    }
}

impl Encoder {
    /// True once all phases went out and no scroll value waits.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.remaining == 0 && !self.wheel_pending
    }

    /// Compose the next report, or `None` once the sequence is drained.
    pub fn next_report(&mut self) -> Option<Report> {
        if self.remaining == 0 && !self.wheel_pending {
            return None;
        }

        let mut report = Report::default();

        if self.remaining > 0 {
            let key_down = self.remaining % 2 == 0;
            if key_down {
                match self.key {
                    Some(Key::LockWorkstation) => {
                        report.modifiers = MODIFIER_LEFT_GUI;
                        report.keycode = KEY_CODE_L;
                    }
                    Some(key) => report.consumer = consumer_flag(key),
                    None => (),
                }
            }
            self.remaining -= 1;
        }

        report.wheel = self.wheel;
        self.wheel = 0;
        self.wheel_pending = false;

        Some(report)
    }
}

fn consumer_flag(key: Key) -> u8 {
    match key {
        Key::VolumeUp => 1 << 0,
        Key::VolumeDown => 1 << 1,
        Key::BrightnessUp => 1 << 2,
        Key::BrightnessDown => 1 << 3,
        Key::MicMute => 1 << 4,
        // Lock goes out through the keyboard bytes instead.
        Key::LockWorkstation => 0,
    }
}
