#![no_main]
#![no_std]

use glide_firmware as _; // global logger + panicking-behavior

#[rtic::app(device = stm32h7xx_hal::pac, peripherals = true, dispatchers = [EXTI0, EXTI1, EXTI2])]
mod app {
    use fugit::ExtU64;
    use systick_monotonic::Systick;

    use glide_control::config::Config;
    use glide_control::decoder::Decoder;
    use glide_control::event::Batch;
    use glide_firmware::system::strip::TouchStrip;
    use glide_firmware::system::usb::Usb;
    use glide_firmware::system::{StatusLed, System};

    const BLINKS: u8 = 1;
    // Give the user 2 seconds to remove the finger, in case the strip was
    // touched while the device was being plugged in.
    const GRACE_DELAY_MS: u64 = 2000;
    const TICK_MS: u64 = 20;

    #[monotonic(binds = SysTick, default = true)]
    type Mono = Systick<1000>; // 1 kHz / 1 ms granularity

    #[shared]
    struct Shared {
        usb: Usb,
    }

    #[local]
    struct Local {
        status_led: StatusLed,
        strip: TouchStrip,
        decoder: Decoder,
        config: Config,
    }

    #[init]
    fn init(cx: init::Context) -> (Shared, Local, init::Monotonics) {
        defmt::info!("INIT");

        let system = System::init(cx.core, cx.device);
        let mono = system.mono;

        blink::spawn(true, BLINKS).unwrap();
        tick::spawn_after(GRACE_DELAY_MS.millis()).unwrap();

        (
            Shared { usb: system.usb },
            Local {
                status_led: system.status_led,
                strip: system.strip,
                decoder: Decoder::default(),
                config: Config::default(),
            },
            init::Monotonics(mono),
        )
    }

    #[task(binds = OTG_HS, shared = [usb], priority = 3)]
    fn usb_event(mut cx: usb_event::Context) {
        cx.shared.usb.lock(|usb| usb.poll());
    }

    #[task(local = [strip, decoder, config], shared = [usb], priority = 2)]
    fn tick(mut cx: tick::Context) {
        let snapshot = cx.local.strip.sample();

        let mut batch = Batch::new();
        cx.local.decoder.tick(&snapshot, *cx.local.config, &mut batch);

        if !batch.is_empty() {
            cx.shared.usb.lock(|usb| usb.enqueue(&mut batch));
        }

        tick::spawn_after(TICK_MS.millis()).unwrap();
    }

    #[task(local = [status_led])]
    fn blink(cx: blink::Context, on: bool, blinks: u8) {
        let time_on = 200.millis();
        let time_off_short = 200.millis();
        let time_off_long = 2.secs();

        if on {
            cx.local.status_led.set_high();
            blink::spawn_after(time_on, false, blinks).unwrap();
        } else {
            cx.local.status_led.set_low();
            if blinks > 1 {
                blink::spawn_after(time_off_short, true, blinks - 1).unwrap();
            } else {
                blink::spawn_after(time_off_long, true, BLINKS).unwrap();
            }
        }
    }
}
