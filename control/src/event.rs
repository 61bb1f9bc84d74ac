//! Events leaving the decoder and the sink consuming them.

use heapless::Vec;

/// Host controls the device can drive.
///
/// Consumer keys are reported through single bits of the consumer byte of
/// the wire report; the workstation lock goes out through the keyboard
/// bytes as Win+L.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    VolumeUp,
    VolumeDown,
    BrightnessUp,
    BrightnessDown,
    MicMute,
    LockWorkstation,
}

/// One decoded action waiting to be encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    Key(Key, u8),
    Scroll(i8),
}

/// Consumer of decoded actions.
///
/// The decoder depends on this capability only, never on a concrete
/// transport.
pub trait EventSink {
    /// Press and release `key` the given number of times. A magnitude of
    /// zero is a no-op.
    fn key_event(&mut self, key: Key, magnitude: u8);

    /// Turn the host scroll wheel. Zero is a valid idle report.
    fn scroll(&mut self, delta: i8);
}

/// Buffer of actions decoded within one tick.
///
/// A tick yields at most one tap outcome and one slide action. The batch
/// collects them so they can be flushed into the report encoder in a single
/// short critical section, after decoding finished.
#[derive(Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Batch {
    actions: Vec<Action, 4>,
}

impl Batch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Replay the buffered actions into another sink and clear the batch.
    pub fn flush_into(&mut self, sink: &mut impl EventSink) {
        for action in &self.actions {
            match *action {
                Action::Key(key, magnitude) => sink.key_event(key, magnitude),
                Action::Scroll(delta) => sink.scroll(delta),
            }
        }
        self.actions.clear();
    }
}

impl EventSink for Batch {
    fn key_event(&mut self, key: Key, magnitude: u8) {
        if magnitude == 0 {
            return;
        }
        let _ = self.actions.push(Action::Key(key, magnitude));
    }

    fn scroll(&mut self, delta: i8) {
        let _ = self.actions.push(Action::Scroll(delta));
    }
}
