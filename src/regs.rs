use std::marker::PhantomData;
use std::ptr::{self, NonNull};

use crate::Calibration;

/// Calibration register block as laid out by the FPGA configuration bus.
///
/// Never referenced directly; [`Registers`] reaches the fields through a raw
/// pointer with volatile reads and writes.
#[repr(C)]
#[derive(Debug)]
pub struct RegisterBlock {
    gain_dac: u32,
    offset_dac: u32,
    gain_adc: u32,
    offset_adc: u32,
}

/// Handle to a [`RegisterBlock`] placed over mapped device memory.
pub struct Registers<'a> {
    block: NonNull<RegisterBlock>,
    _map: PhantomData<&'a mut [u8]>,
}

impl<'a> Registers<'a> {
    /// # Safety
    /// `block` must be aligned and point to at least 16 bytes that stay
    /// mapped and writable for `'a`.
    pub unsafe fn new(block: NonNull<RegisterBlock>) -> Self {
        Registers {
            block,
            _map: PhantomData,
        }
    }

    /// Write the four calibration words, DAC gain first.
    pub fn apply(&mut self, cal: &Calibration) {
        let b = self.block.as_ptr();
        unsafe {
            ptr::write_volatile(ptr::addr_of_mut!((*b).gain_dac), cal.gain_dac);
            ptr::write_volatile(ptr::addr_of_mut!((*b).offset_dac), cal.offset_dac);
            ptr::write_volatile(ptr::addr_of_mut!((*b).gain_adc), cal.gain_adc);
            ptr::write_volatile(ptr::addr_of_mut!((*b).offset_adc), cal.offset_adc);
        }
    }

    pub fn snapshot(&self) -> Calibration {
        let b = self.block.as_ptr();
        unsafe {
            Calibration {
                gain_dac: ptr::read_volatile(ptr::addr_of!((*b).gain_dac)),
                offset_dac: ptr::read_volatile(ptr::addr_of!((*b).offset_dac)),
                gain_adc: ptr::read_volatile(ptr::addr_of!((*b).gain_adc)),
                offset_adc: ptr::read_volatile(ptr::addr_of!((*b).offset_adc)),
            }
        }
    }
}
