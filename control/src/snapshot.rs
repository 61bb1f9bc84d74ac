//! Structures used to pass one sampling period of the touch strip.

/// Number of pads on the strip.
pub const CHANNELS: usize = 8;

/// Intensities of all pads for one sampling period.
///
/// `Snapshot` is meant to be passed from the hardware binding to the
/// decoder. It carries raw readings; presence and position detection
/// is done by the decoder.
#[derive(Debug, Default, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    pub channels: [u16; CHANNELS],
}
