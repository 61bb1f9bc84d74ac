//! USB transport: a single HID interface carrying the 4 byte reports.

use usb_device::class_prelude::*;
use usb_device::control;
use usb_device::device::{UsbDevice, UsbDeviceBuilder, UsbDeviceState, UsbVidPid};

use glide_control::descriptor::REPORT_DESCRIPTOR;
use glide_control::event::{Batch, EventSink, Key};
use glide_control::report::{Encoder, Report};

use crate::system::hal::usb_hs::{UsbBus, USB1};

// Shared VID/PID pair for hobbyist HID devices, from the V-USB pool.
const VID_PID: UsbVidPid = UsbVidPid(0x16C0, 0x27DC);

const USB_CLASS_HID: u8 = 0x03;
const DESCRIPTOR_TYPE_HID: u8 = 0x21;
const DESCRIPTOR_TYPE_REPORT: u8 = 0x22;

pub type Bus = UsbBus<USB1>;

/// The device side of the report pipeline.
///
/// Bundles the USB device, the HID interface and the report encoder into
/// one object, because all three are touched from both the tick context and
/// the USB interrupt. The caller is expected to guard access to it; both
/// paths run a read-modify-write of the pacing state.
pub struct Usb {
    device: UsbDevice<'static, Bus>,
    hid: HidClass<'static, Bus>,
    encoder: Encoder,
    in_flight: bool,
}

impl Usb {
    #[must_use]
    pub fn new(alloc: &'static UsbBusAllocator<Bus>) -> Self {
        let hid = HidClass::new(alloc);
        let device = UsbDeviceBuilder::new(alloc, VID_PID)
            .manufacturer("Zlosynth Instruments")
            .product("Glide")
            .serial_number("42")
            .max_packet_size_0(64)
            .build();

        Self {
            device,
            hid,
            encoder: Encoder::default(),
            in_flight: false,
        }
    }

    /// Flush one tick's worth of decoded actions into the encoder and start
    /// transmitting, unless a report is already on the wire.
    pub fn enqueue(&mut self, batch: &mut Batch) {
        batch.flush_into(self);
    }

    /// Service the peripheral. Continues a phased down/up sequence whenever
    /// the previous transmission completed.
    pub fn poll(&mut self) {
        self.device.poll(&mut [&mut self.hid]);
        if self.hid.take_tx_complete() {
            self.in_flight = false;
            self.send_next();
        }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.device.state() == UsbDeviceState::Configured
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        !self.in_flight && self.encoder.is_idle()
    }

    fn send_next(&mut self) {
        if self.in_flight {
            return;
        }
        if let Some(report) = self.encoder.next_report() {
            // A failed write means the host is not listening yet. The
            // report is dropped, the next tick produces a fresh one.
            if self.hid.write_report(&report).is_ok() {
                self.in_flight = true;
            }
        }
    }
}

impl EventSink for Usb {
    fn key_event(&mut self, key: Key, magnitude: u8) {
        self.encoder.key_event(key, magnitude);
        self.send_next();
    }

    fn scroll(&mut self, delta: i8) {
        self.encoder.scroll(delta);
        self.send_next();
    }
}

/// Minimal HID class: one interface, one interrupt IN endpoint.
///
/// It answers the single control request the host needs to interpret the
/// reports, the report descriptor read. Every other request aimed at the
/// interface is left unhandled and stalls.
pub struct HidClass<'a, B: usb_device::bus::UsbBus> {
    interface: InterfaceNumber,
    endpoint: EndpointIn<'a, B>,
    tx_complete: bool,
}

impl<'a, B: usb_device::bus::UsbBus> HidClass<'a, B> {
    pub fn new(alloc: &'a UsbBusAllocator<B>) -> Self {
        Self {
            interface: alloc.interface(),
            endpoint: alloc.interrupt(4, 10),
            tx_complete: false,
        }
    }

    pub fn write_report(&mut self, report: &Report) -> usb_device::Result<usize> {
        self.endpoint.write(&report.to_bytes())
    }

    /// True once since the last transmission finished.
    pub fn take_tx_complete(&mut self) -> bool {
        core::mem::take(&mut self.tx_complete)
    }

    fn targets_interface(&self, request: &control::Request) -> bool {
        request.recipient == control::Recipient::Interface
            && request.index == u16::from(u8::from(self.interface))
    }
}

impl<B: usb_device::bus::UsbBus> UsbClass<B> for HidClass<'_, B> {
    fn get_configuration_descriptors(
        &self,
        writer: &mut DescriptorWriter,
    ) -> usb_device::Result<()> {
        writer.interface(self.interface, USB_CLASS_HID, 0x00, 0x00)?;
        writer.write(
            DESCRIPTOR_TYPE_HID,
            &[
                0x10, // bcdHID, HID class specification 1.10
                0x01,
                0x00, // country code, not supported
                0x01, // one class descriptor follows
                DESCRIPTOR_TYPE_REPORT,
                REPORT_DESCRIPTOR.len() as u8,
                (REPORT_DESCRIPTOR.len() >> 8) as u8,
            ],
        )?;
        writer.endpoint(&self.endpoint)?;
        Ok(())
    }

    fn control_in(&mut self, xfer: ControlIn<B>) {
        let request = *xfer.request();
        if !self.targets_interface(&request) {
            return;
        }

        match request.request_type {
            control::RequestType::Standard => {
                let descriptor_type = (request.value >> 8) as u8;
                if request.request == control::Request::GET_DESCRIPTOR
                    && descriptor_type == DESCRIPTOR_TYPE_REPORT
                {
                    xfer.accept_with_static(REPORT_DESCRIPTOR).ok();
                }
            }
            // Class requests (GET_REPORT, GET_IDLE, ...) are not supported,
            // the host recovers from the stall.
            control::RequestType::Class => {
                xfer.reject().ok();
            }
            _ => (),
        }
    }

    fn control_out(&mut self, xfer: ControlOut<B>) {
        let request = *xfer.request();
        if !self.targets_interface(&request) {
            return;
        }

        // SET_REPORT, SET_IDLE and friends are not supported either.
        if request.request_type == control::RequestType::Class {
            xfer.reject().ok();
        }
    }

    fn endpoint_in_complete(&mut self, addr: EndpointAddress) {
        if addr == self.endpoint.address() {
            self.tx_complete = true;
        }
    }
}
