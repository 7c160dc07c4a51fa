/*++

Licensed under the Apache-2.0 license.

File Name:

    pwr.rs

Abstract:

    File contains the registry of controller registers preserved across
    low-power suspend/resume cycles.

--*/

use alloc::vec::Vec;

use crate::{caam_trace, cprintln, CaamError, CaamResult};
use caam_mmio::{Mmio, MmioMut, RegWidth};

/// Run of registers to preserve, relative to the base address an owner
/// registers it with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegList {
    /// Offset of the first register from the base address
    pub offset: usize,

    /// Width of each register access
    pub width: RegWidth,

    /// Number of registers in the run
    pub count: usize,

    /// Distance in bytes between two consecutive registers
    pub stride: usize,
}

impl RegList {
    /// A single 32-bit register at `offset`.
    pub const fn word(offset: usize) -> Self {
        Self {
            offset,
            width: RegWidth::Word,
            count: 1,
            stride: 4,
        }
    }
}

/// Catalogue entry: one owner's register lists and their last snapshot.
struct PwrEntry {
    base: usize,
    regs: &'static [RegList],
    snapshot: Vec<u32>,
    valid: bool,
}

impl PwrEntry {
    /// Visit every register access of the entry in list order.
    ///
    /// # Arguments
    ///
    /// * `f` - Called with the register address, its width and the snapshot
    ///         slot holding its value
    fn for_each_reg(&self, mut f: impl FnMut(usize, RegWidth, usize)) -> CaamResult<()> {
        let mut slot = 0;
        for list in self.regs {
            let first = self
                .base
                .checked_add(list.offset)
                .ok_or(CaamError::DRIVER_PWR_ADDR_OVERFLOW)?;
            for i in 0..list.count {
                let addr = i
                    .checked_mul(list.stride)
                    .and_then(|delta| first.checked_add(delta))
                    .ok_or(CaamError::DRIVER_PWR_ADDR_OVERFLOW)?;
                if addr % list.width.bytes() != 0 {
                    return Err(CaamError::DRIVER_PWR_ADDR_MISALIGNED);
                }
                f(addr, list.width, slot);
                slot += 1;
            }
        }
        Ok(())
    }
}

/// Append-only catalogue of register regions to snapshot before power loss
/// and replay after resume.
///
/// Entries are walked in registration order, and the registers of a single
/// entry in the order of its lists, so an owner encodes any required write
/// ordering in the list it registers.
#[derive(Default)]
pub struct PwrBackup {
    entries: Vec<PwrEntry>,
}

impl PwrBackup {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a set of registers for backup
    ///
    /// # Arguments
    ///
    /// * `base` - Base address the list offsets are relative to
    /// * `regs` - Registers to preserve, in restore order
    ///
    /// # Returns
    ///
    /// * `CaamResult<()>` - BAD_PARAMETERS class error if the list is empty or
    ///   describes misaligned or overflowing addresses, OUT_OF_MEMORY class
    ///   error if the snapshot buffer cannot be reserved
    pub fn add_backup(&mut self, base: usize, regs: &'static [RegList]) -> CaamResult<()> {
        if regs.is_empty() {
            return Err(CaamError::DRIVER_PWR_INVALID_ENTRY);
        }

        let mut slots: usize = 0;
        for list in regs {
            if list.count == 0 || list.stride < list.width.bytes() {
                return Err(CaamError::DRIVER_PWR_INVALID_ENTRY);
            }
            slots = slots
                .checked_add(list.count)
                .ok_or(CaamError::DRIVER_PWR_INVALID_ENTRY)?;
        }

        let mut entry = PwrEntry {
            base,
            regs,
            snapshot: Vec::new(),
            valid: false,
        };
        entry.for_each_reg(|_, _, _| {})?;

        entry
            .snapshot
            .try_reserve_exact(slots)
            .map_err(|_| CaamError::DRIVER_PWR_OUT_OF_MEMORY)?;
        entry.snapshot.resize(slots, 0);
        self.entries
            .try_reserve(1)
            .map_err(|_| CaamError::DRIVER_PWR_OUT_OF_MEMORY)?;

        caam_trace!("[pwr] add backup base 0x{:x} ({} regs)", base, slots);
        self.entries.push(entry);
        Ok(())
    }

    /// Number of registered entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of entry `idx` if it holds one not yet consumed by a restore
    pub fn snapshot(&self, idx: usize) -> Option<&[u32]> {
        self.entries
            .get(idx)
            .filter(|entry| entry.valid)
            .map(|entry| entry.snapshot.as_slice())
    }

    /// Read every registered register into its entry's snapshot.
    ///
    /// A failing entry is reported and left without a valid snapshot; the
    /// walk continues with the next entry.
    ///
    /// # Returns
    ///
    /// * `CaamResult<()>` - First error met during the walk
    pub fn do_backup(&mut self, mmio: &impl Mmio) -> CaamResult<()> {
        let mut status = Ok(());
        for (idx, entry) in self.entries.iter_mut().enumerate() {
            let mut snapshot = core::mem::take(&mut entry.snapshot);
            let result = entry.for_each_reg(|addr, width, slot| {
                if let Some(val) = snapshot.get_mut(slot) {
                    *val = mmio.read(width, addr);
                }
            });
            entry.snapshot = snapshot;
            entry.valid = result.is_ok();
            if let Err(err) = result {
                cprintln!("[pwr] backup of entry {} failed: 0x{:x}", idx, u32::from(err));
                status = status.and(Err(err));
            }
        }
        status
    }

    /// Write every snapshot back verbatim, consuming it.
    ///
    /// An entry without a snapshot, or whose addresses cannot be formed, is
    /// reported and skipped; the remaining entries are still restored.
    ///
    /// # Returns
    ///
    /// * `CaamResult<()>` - First error met during the walk
    pub fn do_restore(&mut self, mmio: &impl MmioMut) -> CaamResult<()> {
        let mut status = Ok(());
        for (idx, entry) in self.entries.iter_mut().enumerate() {
            let result = if entry.valid {
                let snapshot = &entry.snapshot;
                entry.for_each_reg(|addr, width, slot| {
                    if let Some(&val) = snapshot.get(slot) {
                        mmio.write(width, val, addr);
                    }
                })
            } else {
                Err(CaamError::DRIVER_PWR_NO_SNAPSHOT)
            };
            entry.valid = false;
            if let Err(err) = result {
                cprintln!("[pwr] restore of entry {} failed: 0x{:x}", idx, u32::from(err));
                status = status.and(Err(err));
            }
        }
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caam_hw_model::ModelMmio;

    static WORDS: [RegList; 2] = [RegList::word(0x4), RegList::word(0x0)];
    static BYTES: [RegList; 1] = [RegList {
        offset: 0x1,
        width: RegWidth::Byte,
        count: 3,
        stride: 2,
    }];
    static MISALIGNED: [RegList; 1] = [RegList {
        offset: 0x1,
        width: RegWidth::HalfWord,
        count: 1,
        stride: 2,
    }];
    static BAD_STRIDE: [RegList; 1] = [RegList {
        offset: 0x0,
        width: RegWidth::Word,
        count: 2,
        stride: 2,
    }];
    static EMPTY: [RegList; 0] = [];

    #[test]
    fn test_add_backup_validation() {
        let mut pwr = PwrBackup::new();
        assert_eq!(
            pwr.add_backup(0x1000, &EMPTY),
            Err(CaamError::DRIVER_PWR_INVALID_ENTRY)
        );
        assert_eq!(
            pwr.add_backup(0x1000, &BAD_STRIDE),
            Err(CaamError::DRIVER_PWR_INVALID_ENTRY)
        );
        assert_eq!(
            pwr.add_backup(0x1000, &MISALIGNED),
            Err(CaamError::DRIVER_PWR_ADDR_MISALIGNED)
        );
        assert_eq!(
            pwr.add_backup(usize::MAX - 2, &WORDS),
            Err(CaamError::DRIVER_PWR_ADDR_OVERFLOW)
        );
        assert!(pwr.is_empty());

        assert_eq!(pwr.add_backup(0x1000, &WORDS), Ok(()));
        assert_eq!(pwr.add_backup(0x2000, &BYTES), Ok(()));
        assert_eq!(pwr.len(), 2);
    }

    #[test]
    fn test_backup_order_and_snapshot() {
        let mmio = ModelMmio::new();
        mmio.poke32(0x1111_1111, 0x1000);
        mmio.poke32(0x2222_2222, 0x1004);
        mmio.poke32(0x0403_0201, 0x2000);
        mmio.poke32(0x0807_0605, 0x2004);

        let mut pwr = PwrBackup::new();
        pwr.add_backup(0x1000, &WORDS).unwrap();
        pwr.add_backup(0x2000, &BYTES).unwrap();
        assert_eq!(pwr.snapshot(0), None);

        assert_eq!(pwr.do_backup(&mmio), Ok(()));
        assert_eq!(pwr.snapshot(0), Some(&[0x2222_2222, 0x1111_1111][..]));
        assert_eq!(pwr.snapshot(1), Some(&[0x02, 0x04, 0x06][..]));

        mmio.log.take();
        assert_eq!(pwr.do_restore(&mmio), Ok(()));
        assert_eq!(
            mmio.log.writes(),
            vec![
                "write32(0x1004, 0x22222222)",
                "write32(0x1000, 0x11111111)",
                "write8(0x2001, 0x2)",
                "write8(0x2003, 0x4)",
                "write8(0x2005, 0x6)",
            ]
        );
        assert_eq!(pwr.snapshot(0), None);
    }

    #[test]
    fn test_restore_without_backup_continues() {
        let mmio = ModelMmio::new();
        let mut pwr = PwrBackup::new();
        pwr.add_backup(0x1000, &WORDS).unwrap();
        pwr.do_backup(&mmio).unwrap();
        pwr.add_backup(0x2000, &BYTES).unwrap();

        mmio.log.take();
        assert_eq!(
            pwr.do_restore(&mmio),
            Err(CaamError::DRIVER_PWR_NO_SNAPSHOT)
        );
        assert_eq!(mmio.log.writes().len(), 2);

        assert_eq!(
            pwr.do_restore(&mmio),
            Err(CaamError::DRIVER_PWR_NO_SNAPSHOT)
        );
    }
}
