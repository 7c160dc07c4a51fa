/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains the register access shim used by the CAAM drivers to
    read and write memory-mapped registers.

--*/

#![no_std]

use core::ptr::{read_volatile, write_volatile};

/// Width of a single register access in bytes.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RegWidth {
    Byte = 1,
    HalfWord = 2,
    Word = 4,
}

impl RegWidth {
    /// Size of the access in bytes.
    pub const fn bytes(self) -> usize {
        self as usize
    }
}

/// Read side of the register bus.
///
/// Accesses are infallible at the type level; a bus fault is a trap that
/// never returns into the caller.
pub trait Mmio {
    fn read8(&self, addr: usize) -> u8;
    fn read16(&self, addr: usize) -> u16;
    fn read32(&self, addr: usize) -> u32;

    /// Read `width` bytes at `addr`, zero-extended to 32 bits.
    fn read(&self, width: RegWidth, addr: usize) -> u32 {
        match width {
            RegWidth::Byte => self.read8(addr).into(),
            RegWidth::HalfWord => self.read16(addr).into(),
            RegWidth::Word => self.read32(addr),
        }
    }
}

/// Write side of the register bus.
pub trait MmioMut: Mmio {
    fn write8(&self, val: u8, addr: usize);
    fn write16(&self, val: u16, addr: usize);
    fn write32(&self, val: u32, addr: usize);

    /// Write the low `width` bytes of `val` at `addr`.
    fn write(&self, width: RegWidth, val: u32, addr: usize) {
        match width {
            RegWidth::Byte => self.write8(val as u8, addr),
            RegWidth::HalfWord => self.write16(val as u16, addr),
            RegWidth::Word => self.write32(val, addr),
        }
    }
}

impl<T: Mmio + ?Sized> Mmio for &T {
    fn read8(&self, addr: usize) -> u8 {
        T::read8(self, addr)
    }
    fn read16(&self, addr: usize) -> u16 {
        T::read16(self, addr)
    }
    fn read32(&self, addr: usize) -> u32 {
        T::read32(self, addr)
    }
}

impl<T: MmioMut + ?Sized> MmioMut for &T {
    fn write8(&self, val: u8, addr: usize) {
        T::write8(self, val, addr)
    }
    fn write16(&self, val: u16, addr: usize) {
        T::write16(self, val, addr)
    }
    fn write32(&self, val: u32, addr: usize) {
        T::write32(self, val, addr)
    }
}

/// Volatile accesses to physical device memory.
#[derive(Debug)]
pub struct RealMmio(());

impl RealMmio {
    /// Create a handle performing raw volatile accesses.
    ///
    /// # Safety
    ///
    /// Every address later passed to this handle must be a valid, mapped,
    /// naturally aligned device register that is not concurrently accessed
    /// through another path.
    pub const unsafe fn new() -> Self {
        Self(())
    }
}

impl Mmio for RealMmio {
    fn read8(&self, addr: usize) -> u8 {
        // SAFETY: guaranteed by the contract of `RealMmio::new`.
        unsafe { read_volatile(addr as *const u8) }
    }

    fn read16(&self, addr: usize) -> u16 {
        // SAFETY: guaranteed by the contract of `RealMmio::new`.
        unsafe { read_volatile(addr as *const u16) }
    }

    fn read32(&self, addr: usize) -> u32 {
        // SAFETY: guaranteed by the contract of `RealMmio::new`.
        unsafe { read_volatile(addr as *const u32) }
    }
}

impl MmioMut for RealMmio {
    fn write8(&self, val: u8, addr: usize) {
        // SAFETY: guaranteed by the contract of `RealMmio::new`.
        unsafe { write_volatile(addr as *mut u8, val) }
    }

    fn write16(&self, val: u16, addr: usize) {
        // SAFETY: guaranteed by the contract of `RealMmio::new`.
        unsafe { write_volatile(addr as *mut u16, val) }
    }

    fn write32(&self, val: u32, addr: usize) {
        // SAFETY: guaranteed by the contract of `RealMmio::new`.
        unsafe { write_volatile(addr as *mut u32, val) }
    }
}
