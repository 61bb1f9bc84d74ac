use glide_control::position;

use crate::system::strip::TouchStrip;

pub fn sample_until_touched(strip: &mut TouchStrip) -> usize {
    loop {
        let snapshot = strip.sample();
        if let Some(pad) = position::detect(&snapshot.channels) {
            return pad;
        }
        cortex_m::asm::delay(400_000_000 / 1000);
    }
}

pub fn sample_until_released(strip: &mut TouchStrip) {
    loop {
        let snapshot = strip.sample();
        if position::detect(&snapshot.channels).is_none() {
            return;
        }
        cortex_m::asm::delay(400_000_000 / 1000);
    }
}
