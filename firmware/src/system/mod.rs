//! Abstraction of the board: touch strip, status LED and USB transport.

pub mod strip;
pub mod usb;

pub use stm32h7xx_hal as hal;

use hal::adc::{AdcSampleTime, Resolution};
use hal::delay::DelayFromCountDownTimer;
use hal::gpio::gpioc::PC13;
use hal::gpio::{Output, PushPull};
use hal::pac::CorePeripherals;
use hal::pac::Peripherals as DevicePeripherals;
use hal::prelude::*;
use hal::rcc::rec::UsbClkSel;
use hal::usb_hs::{UsbBus, USB1};
use systick_monotonic::Systick;
use usb_device::bus::UsbBusAllocator;

use strip::{Pads, TouchStrip};
use usb::Usb;

pub type StatusLed = PC13<Output<PushPull>>;

pub struct System {
    pub mono: Systick<1000>,
    pub status_led: StatusLed,
    pub strip: TouchStrip,
    pub usb: Usb,
}

static mut EP_MEMORY: [u32; 1024] = [0; 1024];

impl System {
    /// Initialize system abstraction
    ///
    /// # Panics
    ///
    /// The system can be initialized only once. It panics otherwise.
    #[must_use]
    pub fn init(mut cp: CorePeripherals, dp: DevicePeripherals) -> Self {
        enable_cache(&mut cp);

        let pwr = dp.PWR.constrain();
        let pwrcfg = pwr.freeze();

        let rcc = dp.RCC.constrain();
        let mut ccdr = rcc.sys_ck(400.MHz()).freeze(pwrcfg, &dp.SYSCFG);

        // The USB peripheral runs from the internal 48 MHz oscillator.
        let _ = ccdr.clocks.hsi48_ck().expect("HSI48 must run");
        ccdr.peripheral.kernel_usb_clk_mux(UsbClkSel::Hsi48);

        let gpioa = dp.GPIOA.split(ccdr.peripheral.GPIOA);
        let gpiob = dp.GPIOB.split(ccdr.peripheral.GPIOB);
        let gpioc = dp.GPIOC.split(ccdr.peripheral.GPIOC);

        let mut delay = DelayFromCountDownTimer::new(dp.TIM2.timer(
            100.Hz(),
            ccdr.peripheral.TIM2,
            &ccdr.clocks,
        ));

        let (adc_1, adc_2) = {
            let (mut adc_1, mut adc_2) = hal::adc::adc12(
                dp.ADC1,
                dp.ADC2,
                &mut delay,
                ccdr.peripheral.ADC12,
                &ccdr.clocks,
            );
            adc_1.set_resolution(Resolution::SIXTEENBIT);
            adc_1.set_sample_time(AdcSampleTime::T_16);
            adc_2.set_resolution(Resolution::SIXTEENBIT);
            adc_2.set_sample_time(AdcSampleTime::T_16);
            (adc_1.enable(), adc_2.enable())
        };

        let mono = Systick::new(cp.SYST, 400_000_000);
        let status_led = gpioc.pc13.into_push_pull_output();

        let strip = TouchStrip::new(
            adc_1,
            adc_2,
            Pads {
                pad_1: gpioa.pa0.into_analog(),
                pad_2: gpioa.pa1.into_analog(),
                pad_3: gpioa.pa2.into_analog(),
                pad_4: gpioa.pa3.into_analog(),
                pad_5: gpioa.pa4.into_analog(),
                pad_6: gpioa.pa5.into_analog(),
                pad_7: gpioa.pa6.into_analog(),
                pad_8: gpioa.pa7.into_analog(),
            },
        );

        let usb = {
            let usb = USB1::new(
                dp.OTG1_HS_GLOBAL,
                dp.OTG1_HS_DEVICE,
                dp.OTG1_HS_PWRCLK,
                gpiob.pb14.into_alternate(),
                gpiob.pb15.into_alternate(),
                ccdr.peripheral.USB1OTG,
                &ccdr.clocks,
            );
            let usb_bus = cortex_m::singleton!(
                : UsbBusAllocator<UsbBus<USB1>> =
                    UsbBus::new(usb, unsafe { &mut EP_MEMORY })
            )
            .unwrap();
            Usb::new(usb_bus)
        };

        Self {
            mono,
            status_led,
            strip,
            usb,
        }
    }
}

/// AN5212: Improve application performance when fetching instruction from
/// the internal memory.
fn enable_cache(cp: &mut CorePeripherals) {
    cp.SCB.enable_icache();
}
