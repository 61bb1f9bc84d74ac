//! Read-only snapshot of the device configuration.

/// Host control driven by slide gestures.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Function {
    #[default]
    Volume,
    Brightness,
    Scroll,
}

/// Configuration applied while decoding slides.
///
/// The configuration is owned by an external store. The decoder only ever
/// reads a copy of it, once per tick.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Swap the up and down direction of the strip.
    pub flip: bool,
    /// Multiplier applied to every position change.
    pub scale: u8,
    pub function: Function,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            flip: false,
            scale: 1,
            function: Function::Volume,
        }
    }
}
