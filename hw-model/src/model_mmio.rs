// Licensed under the Apache-2.0 license

use std::{cell::RefCell, collections::BTreeMap};

use caam_mmio::{Mmio, MmioMut, RegWidth};

use crate::Log;

/// A hardware write-once lock.
///
/// While any bit of `lock_mask` is set in the 32-bit register at
/// `lock_addr`, writes touching any of the `protected` 32-bit registers are
/// silently dropped, the way the controller ignores writes to a locked
/// job-ring DID register pair.
#[derive(Clone, Debug)]
pub struct WriteLock {
    pub lock_addr: usize,
    pub lock_mask: u32,
    pub protected: Vec<usize>,
}

impl WriteLock {
    fn covers(&self, width: RegWidth, addr: usize) -> bool {
        let end = addr + width.bytes();
        self.protected
            .iter()
            .any(|&reg| addr < reg + 4 && reg < end)
    }
}

/// A sparse, byte-addressed register file implementing the MMIO shim.
///
/// Unwritten bytes read as zero. Every access made through the [`Mmio`] /
/// [`MmioMut`] traits is recorded in `log`; `peek*`/`poke*` bypass both the
/// log and the write locks.
pub struct ModelMmio {
    mem: RefCell<BTreeMap<usize, u8>>,
    locks: Vec<WriteLock>,
    pub log: Log,
}

impl ModelMmio {
    pub fn new() -> Self {
        Self {
            mem: RefCell::new(BTreeMap::new()),
            locks: Vec::new(),
            log: Log::new(),
        }
    }

    /// Install a write-once lock rule.
    pub fn add_write_lock(&mut self, lock: WriteLock) {
        self.locks.push(lock);
    }

    /// Clear all register contents, as happens when the power domain is cut.
    ///
    /// Lock rules stay installed; the lock bits themselves are cleared.
    pub fn power_cycle(&self) {
        self.mem.borrow_mut().clear();
        self.log.record(format_args!("power_cycle()"));
    }

    /// Read a value without logging.
    pub fn peek(&self, width: RegWidth, addr: usize) -> u32 {
        let mem = self.mem.borrow();
        let mut bytes = [0u8; 4];
        for (i, byte) in bytes.iter_mut().take(width.bytes()).enumerate() {
            *byte = mem.get(&(addr + i)).copied().unwrap_or(0);
        }
        u32::from_le_bytes(bytes)
    }

    pub fn peek32(&self, addr: usize) -> u32 {
        self.peek(RegWidth::Word, addr)
    }

    /// Store a value without logging and ignoring write locks.
    pub fn poke(&self, width: RegWidth, val: u32, addr: usize) {
        let mut mem = self.mem.borrow_mut();
        for (i, byte) in val.to_le_bytes().iter().take(width.bytes()).enumerate() {
            mem.insert(addr + i, *byte);
        }
    }

    pub fn poke32(&self, val: u32, addr: usize) {
        self.poke(RegWidth::Word, val, addr)
    }

    /// Copy of every byte written so far, keyed by address.
    pub fn snapshot(&self) -> BTreeMap<usize, u8> {
        self.mem.borrow().clone()
    }

    fn locked(&self, width: RegWidth, addr: usize) -> bool {
        self.locks
            .iter()
            .any(|lock| self.peek32(lock.lock_addr) & lock.lock_mask != 0 && lock.covers(width, addr))
    }

    fn logged_read(&self, width: RegWidth, addr: usize) -> u32 {
        let val = self.peek(width, addr);
        let bits = width.bytes() * 8;
        self.log.record(format_args!("read{bits}({addr:#x}) -> {val:#x}"));
        val
    }

    fn logged_write(&self, width: RegWidth, val: u32, addr: usize) {
        let bits = width.bytes() * 8;
        if self.locked(width, addr) {
            self.log.record(format_args!("ignored write{bits}({addr:#x}, {val:#x})"));
            return;
        }
        self.log.record(format_args!("write{bits}({addr:#x}, {val:#x})"));
        self.poke(width, val, addr);
    }
}

impl Default for ModelMmio {
    fn default() -> Self {
        Self::new()
    }
}

impl Mmio for ModelMmio {
    fn read8(&self, addr: usize) -> u8 {
        self.logged_read(RegWidth::Byte, addr) as u8
    }

    fn read16(&self, addr: usize) -> u16 {
        self.logged_read(RegWidth::HalfWord, addr) as u16
    }

    fn read32(&self, addr: usize) -> u32 {
        self.logged_read(RegWidth::Word, addr)
    }
}

impl MmioMut for ModelMmio {
    fn write8(&self, val: u8, addr: usize) {
        self.logged_write(RegWidth::Byte, val.into(), addr)
    }

    fn write16(&self, val: u16, addr: usize) {
        self.logged_write(RegWidth::HalfWord, val.into(), addr)
    }

    fn write32(&self, val: u32, addr: usize) {
        self.logged_write(RegWidth::Word, val, addr)
    }
}
