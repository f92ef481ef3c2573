pub mod calibration;
pub mod mmio;
pub mod regs;

pub use calibration::{register_value, Calibration};
pub use mmio::{Mmio, MmioError, CALIBRATION_BASE, DEV_MEM};
pub use regs::{RegisterBlock, Registers};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke() {
        // the calibration block must sit on a page boundary
        assert!(Mmio::page_size().is_power_of_two());
        assert_eq!(CALIBRATION_BASE % Mmio::page_size() as u64, 0);
    }
}
