//! Sample ROM access
//!
//! The chip sees its sample ROM as a flat, byte-addressable space. Hosts
//! attach whatever backs it (a plain dump, a banked window, a memory map)
//! through [`SampleRom`]. Reads are synchronous and must always return a
//! byte; what lies beyond the end of the ROM is the host's decision.

use std::sync::Arc;

/// Byte-read contract between the chip and its attached sample ROM.
pub trait SampleRom {
    /// Read the byte at `address`.
    fn read_byte(&self, address: u32) -> u8;
}

impl SampleRom for [u8] {
    /// Reads past the end of the slice return 0.
    #[inline]
    fn read_byte(&self, address: u32) -> u8 {
        self.get(address as usize).copied().unwrap_or(0)
    }
}

impl<const N: usize> SampleRom for [u8; N] {
    #[inline]
    fn read_byte(&self, address: u32) -> u8 {
        self.as_slice().read_byte(address)
    }
}

impl SampleRom for Vec<u8> {
    #[inline]
    fn read_byte(&self, address: u32) -> u8 {
        self.as_slice().read_byte(address)
    }
}

impl SampleRom for Arc<[u8]> {
    #[inline]
    fn read_byte(&self, address: u32) -> u8 {
        self.as_ref().read_byte(address)
    }
}

impl<R: SampleRom + ?Sized> SampleRom for &R {
    #[inline]
    fn read_byte(&self, address: u32) -> u8 {
        (**self).read_byte(address)
    }
}

impl<R: SampleRom + ?Sized> SampleRom for Box<R> {
    #[inline]
    fn read_byte(&self, address: u32) -> u8 {
        (**self).read_byte(address)
    }
}

/// Adapter turning a closure into a [`SampleRom`].
///
/// ```
/// use multipcm::rom::{RomFn, SampleRom};
///
/// // Mirror a 64 KiB dump across the address space.
/// let dump = vec![0u8; 0x10000];
/// let rom = RomFn(move |address: u32| dump[(address & 0xffff) as usize]);
/// assert_eq!(rom.read_byte(0x12_3456), 0);
/// ```
#[derive(Clone)]
pub struct RomFn<F>(pub F);

impl<F> SampleRom for RomFn<F>
where
    F: Fn(u32) -> u8,
{
    #[inline]
    fn read_byte(&self, address: u32) -> u8 {
        (self.0)(address)
    }
}

impl<F> std::fmt::Debug for RomFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RomFn")
    }
}
