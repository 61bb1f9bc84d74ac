//! Sampling of the capacitive strip pads.

use nb::block;

use glide_control::snapshot::Snapshot;

use crate::system::hal::adc::{Adc, Enabled};
use crate::system::hal::gpio;
use crate::system::hal::pac::{ADC1, ADC2};

/// Hardware binding of the touch strip.
///
/// Every pad of the strip is buffered by the analog frontend into one ADC
/// channel. A higher reading means a stronger touch. The strip is read in
/// full once per tick, pads split between the two converters.
pub struct TouchStrip {
    adc_1: Adc<ADC1, Enabled>,
    adc_2: Adc<ADC2, Enabled>,
    pads: Pads,
}

pub struct Pads {
    pub pad_1: gpio::gpioa::PA0<gpio::Analog>,
    pub pad_2: gpio::gpioa::PA1<gpio::Analog>,
    pub pad_3: gpio::gpioa::PA2<gpio::Analog>,
    pub pad_4: gpio::gpioa::PA3<gpio::Analog>,
    pub pad_5: gpio::gpioa::PA4<gpio::Analog>,
    pub pad_6: gpio::gpioa::PA5<gpio::Analog>,
    pub pad_7: gpio::gpioa::PA6<gpio::Analog>,
    pub pad_8: gpio::gpioa::PA7<gpio::Analog>,
}

impl TouchStrip {
    pub fn new(adc_1: Adc<ADC1, Enabled>, adc_2: Adc<ADC2, Enabled>, pads: Pads) -> Self {
        Self { adc_1, adc_2, pads }
    }

    /// Read all pads, producing one tick's worth of intensities.
    pub fn sample(&mut self) -> Snapshot {
        let mut snapshot = Snapshot::default();

        self.adc_1.start_conversion(&mut self.pads.pad_1);
        self.adc_2.start_conversion(&mut self.pads.pad_2);
        snapshot.channels[0] = read_sample_1(&mut self.adc_1);
        snapshot.channels[1] = read_sample_2(&mut self.adc_2);

        self.adc_1.start_conversion(&mut self.pads.pad_3);
        self.adc_2.start_conversion(&mut self.pads.pad_4);
        snapshot.channels[2] = read_sample_1(&mut self.adc_1);
        snapshot.channels[3] = read_sample_2(&mut self.adc_2);

        self.adc_1.start_conversion(&mut self.pads.pad_5);
        self.adc_2.start_conversion(&mut self.pads.pad_6);
        snapshot.channels[4] = read_sample_1(&mut self.adc_1);
        snapshot.channels[5] = read_sample_2(&mut self.adc_2);

        self.adc_1.start_conversion(&mut self.pads.pad_7);
        self.adc_2.start_conversion(&mut self.pads.pad_8);
        snapshot.channels[6] = read_sample_1(&mut self.adc_1);
        snapshot.channels[7] = read_sample_2(&mut self.adc_2);

        snapshot
    }
}

fn read_sample_1(adc: &mut Adc<ADC1, Enabled>) -> u16 {
    let sample: u32 = block!(adc.read_sample()).unwrap_or_default();
    sample as u16
}

fn read_sample_2(adc: &mut Adc<ADC2, Enabled>) -> u16 {
    let sample: u32 = block!(adc.read_sample()).unwrap_or_default();
    sample as u16
}
