use memmap2::{MmapMut, MmapOptions};
use std::fs::OpenOptions;
use std::io;
use std::mem;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use thiserror::Error;

use crate::regs::{RegisterBlock, Registers};

#[derive(Debug, Error)]
pub enum MmioError {
    #[error("open {}: {err}", path.display())]
    Open { path: PathBuf, err: io::Error },
    #[error("map error: {0}")]
    Map(String),
    #[error("layout: {0}")]
    Layout(String),
}

pub struct Mmio {
    map: MmapMut,
    base: u64,
    len: usize,
    page_offset: usize,
}

/// Physical memory device used when no other path is given.
pub const DEV_MEM: &str = "/dev/mem";

// Red Pitaya configuration block holding the calibration registers.
pub const CALIBRATION_BASE: u64 = 0x4000_0000;

impl Mmio {
    /// Map `len` bytes at physical `base` of a memory device (usually [`DEV_MEM`],
    /// which requires root privileges). Regular files map the same way.
    ///
    /// `base` does not need to be page aligned: the mapping starts at the
    /// enclosing page boundary and grows by the in-page offset.
    pub fn map_device<P: AsRef<Path>>(path: P, base: u64, len: usize) -> Result<Self> {
        let path = path.as_ref();
        let dev = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|err| MmioError::Open {
                path: path.to_path_buf(),
                err,
            })?;

        let page_offset = (base as usize) & (Mmio::page_size() - 1);
        let aligned_base = base - (page_offset as u64);
        let aligned_len = len + page_offset;

        let map = unsafe {
            MmapOptions::new()
                .offset(aligned_base)
                .len(aligned_len)
                .map_mut(&dev)
                .map_err(|e| MmioError::Map(e.to_string()))?
        };

        Ok(Mmio {
            map,
            base,
            len,
            page_offset,
        })
    }

    /// OS page size, falling back to 4 KiB if `sysconf` has no answer.
    pub fn page_size() -> usize {
        let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if size > 0 {
            size as usize
        } else {
            4096
        }
    }

    /// Physical address the mapping was requested at.
    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Place the calibration register block over the start of the mapped region.
    pub fn registers(&mut self) -> Result<Registers<'_>> {
        let region = &mut self.map[self.page_offset..];
        if region.len() < mem::size_of::<RegisterBlock>() {
            return Err(MmioError::Layout(format!(
                "mapped {} bytes, register block needs {}",
                region.len(),
                mem::size_of::<RegisterBlock>()
            )));
        }

        let ptr = region.as_mut_ptr() as *mut RegisterBlock;
        if ptr.align_offset(mem::align_of::<RegisterBlock>()) != 0 {
            return Err(MmioError::Layout(format!(
                "base {:#X} is not {}-byte aligned",
                self.base,
                mem::align_of::<RegisterBlock>()
            )));
        }

        let block = NonNull::new(ptr).ok_or_else(|| MmioError::Layout("null mapping".into()))?;
        // size and alignment checked above; the borrow of `self` keeps the page mapped
        Ok(unsafe { Registers::new(block) })
    }
}

pub type Result<T> = std::result::Result<T, MmioError>;
