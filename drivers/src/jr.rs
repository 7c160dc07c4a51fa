/*++

Licensed under the Apache-2.0 license.

File Name:

    jr.rs

Abstract:

    File contains API for assigning and locking the ownership of the
    controller job rings.

--*/

use bitfield::bitfield;
use tock_registers::LocalRegisterCopy;

use crate::pwr::{PwrBackup, RegList};
use crate::reg::jr_regs::{
    jrx_did_ls, jrx_did_ms, JR0DID_LS, JR0DID_MS, JR0_OFFSET, JRDID_MS, JRXDID_SIZE,
    JR_BLOCK_SIZE, JR_COUNT,
};
use crate::{caam_trace, cprintln, CaamConfig, CaamError, CaamResult};
use caam_mmio::{Mmio, MmioMut};

/// Largest primary domain identifier
const DID_MAX: u8 = 0xf;

/// Largest isolation context identifier
const ICID_MAX: u16 = 0x3ff;

/// Job ring DID registers preserved across suspend, LS first so that the
/// register that may assert the lock is replayed last.
static JRCFG_BACKUP: [RegList; 2] = [RegList::word(JR0DID_LS), RegList::word(JR0DID_MS)];

bitfield! {
    /// Packed owner word used by the platform configuration
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct JrOwnerWord(u32);
    impl Debug;

    /// Primary domain identifier
    pub u8, did, set_did: 3, 0;

    /// Flag indicating the owner is the secure world
    pub secure, set_secure: 4;
}

/// Owner of a job ring: the domain granted access to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobRingOwner {
    did: u8,
    secure: bool,
    icid: u16,
}

impl JobRingOwner {
    /// Create an owner
    ///
    /// # Arguments
    ///
    /// * `did`    - Primary domain identifier (4 bits)
    /// * `secure` - Owner is the secure world
    /// * `icid`   - Isolation context identifier (10 bits)
    pub const fn new(did: u8, secure: bool, icid: u16) -> CaamResult<Self> {
        if did > DID_MAX || icid > ICID_MAX {
            return Err(CaamError::DRIVER_JR_INVALID_OWNER);
        }
        Ok(Self { did, secure, icid })
    }

    /// Secure-world owner whose isolation context is its domain
    pub const fn secure(did: u8) -> CaamResult<Self> {
        Self::new(did, true, did as u16)
    }

    /// Non-secure owner whose isolation context is its domain
    pub const fn non_secure(did: u8) -> CaamResult<Self> {
        Self::new(did, false, did as u16)
    }

    /// Decode a packed owner word. The isolation context is the domain.
    pub fn from_raw(raw: u32) -> Self {
        let word = JrOwnerWord(raw);
        Self {
            did: word.did(),
            secure: word.secure(),
            icid: word.did().into(),
        }
    }

    pub fn did(&self) -> u8 {
        self.did
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn icid(&self) -> u16 {
        self.icid
    }
}

impl From<JobRingOwner> for JrOwnerWord {
    fn from(owner: JobRingOwner) -> Self {
        let mut word = JrOwnerWord(0);
        word.set_did(owner.did);
        word.set_secure(owner.secure);
        word
    }
}

/// Values of the DID register pair for one owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DidConfig {
    pub ms: u32,
    pub ls: u32,
}

impl DidConfig {
    /// Compute the DID register values programmed for an owner
    ///
    /// # Arguments
    ///
    /// * `owner` - Job ring owner
    /// * `cfg`   - Driver configuration
    pub fn for_owner(owner: &JobRingOwner, cfg: &CaamConfig) -> Self {
        let mut ms = JRDID_MS::PRIM_DID.val(owner.did.into())
            + JRDID_MS::PRIM_ICID.val(owner.icid.into());

        if owner.secure {
            ms = ms + JRDID_MS::PRIM_TZ::SET + JRDID_MS::TZ_OWN::SET + JRDID_MS::AMTD::SET;
            if cfg.sw_crypto_grant {
                ms = ms + JRDID_MS::LDID::SET + JRDID_MS::LAMTD::SET;
            }
        }

        Self {
            ms: ms.value,
            ls: 0,
        }
    }

    /// Classify the latched DID register values against this configuration
    ///
    /// # Arguments
    ///
    /// * `did_ms`  - Value of the DID_MS register
    /// * `read_ls` - Reads the DID_LS register; only called when the lock is
    ///               set and DID_MS matches
    pub fn lock_state(&self, did_ms: u32, read_ls: impl FnOnce() -> u32) -> LockState {
        let latched = LocalRegisterCopy::<u32, JRDID_MS::Register>::new(did_ms);
        if !latched.is_set(JRDID_MS::LDID) {
            return LockState::Unlocked;
        }

        if (self.ms | JRDID_MS::LDID::SET.value) == did_ms && read_ls() == self.ls {
            LockState::LockedMatching
        } else {
            LockState::LockedMismatched
        }
    }
}

/// Ownership lock state of a job ring, derived from its registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// Ownership registers are writable
    Unlocked,

    /// Locked to the requested owner
    LockedMatching,

    /// Locked to a different owner
    LockedMismatched,
}

/// Register action taken for a lock state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerAction {
    /// Write DID_LS then DID_MS
    Program,

    /// Leave the latched configuration in place
    Keep,
}

impl LockState {
    /// Decide what to do with the ownership registers.
    ///
    /// # Returns
    ///
    /// * `CaamResult<OwnerAction>` - `DRIVER_JR_OWNER_LOCKED_MISMATCH` when the
    ///   ring is locked to another owner
    pub fn decide(self) -> CaamResult<OwnerAction> {
        match self {
            LockState::Unlocked => Ok(OwnerAction::Program),
            LockState::LockedMatching => Ok(OwnerAction::Keep),
            LockState::LockedMismatched => Err(CaamError::DRIVER_JR_OWNER_LOCKED_MISMATCH),
        }
    }
}

/// Index of the job ring whose register block sits at `jr_offset` from the
/// controller base
///
/// # Arguments
///
/// * `jr_offset` - Job ring register block offset
pub fn jr_index(jr_offset: usize) -> CaamResult<usize> {
    let rel = jr_offset
        .checked_sub(JR0_OFFSET)
        .ok_or(CaamError::DRIVER_JR_INVALID_OFFSET)?;
    if rel % JR_BLOCK_SIZE != 0 {
        return Err(CaamError::DRIVER_JR_INVALID_OFFSET);
    }
    let idx = rel / JR_BLOCK_SIZE;
    if idx >= JR_COUNT {
        return Err(CaamError::DRIVER_JR_INVALID_OFFSET);
    }
    Ok(idx)
}

fn did_addrs(ctrl_base: usize, idx: usize) -> CaamResult<(usize, usize)> {
    let ms = ctrl_base
        .checked_add(jrx_did_ms(idx))
        .ok_or(CaamError::DRIVER_JR_INVALID_OFFSET)?;
    let ls = ctrl_base
        .checked_add(jrx_did_ls(idx))
        .ok_or(CaamError::DRIVER_JR_INVALID_OFFSET)?;
    Ok((ms, ls))
}

/// Read the ownership lock state of a job ring for an owner
///
/// # Arguments
///
/// * `mmio`      - Register bus
/// * `ctrl_base` - Controller register block base address
/// * `jr_offset` - Job ring register block offset
/// * `owner`     - Owner the lock is checked against
/// * `cfg`       - Driver configuration
pub fn lock_state(
    mmio: &impl Mmio,
    ctrl_base: usize,
    jr_offset: usize,
    owner: &JobRingOwner,
    cfg: &CaamConfig,
) -> CaamResult<LockState> {
    let idx = jr_index(jr_offset)?;
    let (ms_addr, ls_addr) = did_addrs(ctrl_base, idx)?;
    let did = DidConfig::for_owner(owner, cfg);
    Ok(did.lock_state(mmio.read32(ms_addr), || mmio.read32(ls_addr)))
}

/// Configure the owner of a job ring and lock it.
///
/// If the ownership is already locked, succeeds only when the latched
/// configuration is the one requested. The lock is a one-time hardware
/// write: a locked ring is never reprogrammed.
///
/// # Arguments
///
/// * `mmio`      - Register bus
/// * `ctrl_base` - Controller register block base address
/// * `jr_offset` - Job ring register block offset
/// * `owner`     - Owner to configure
/// * `cfg`       - Driver configuration
pub fn set_owner(
    mmio: &impl MmioMut,
    ctrl_base: usize,
    jr_offset: usize,
    owner: &JobRingOwner,
    cfg: &CaamConfig,
) -> CaamResult<()> {
    let idx = jr_index(jr_offset)?;
    let (ms_addr, ls_addr) = did_addrs(ctrl_base, idx)?;
    let did = DidConfig::for_owner(owner, cfg);

    let did_ms = mmio.read32(ms_addr);
    caam_trace!("[jr] JR{} DID_MS 0x{:x} (want 0x{:x})", idx, did_ms, did.ms);

    match did.lock_state(did_ms, || mmio.read32(ls_addr)).decide() {
        Ok(OwnerAction::Program) => {
            caam_trace!("[jr] JR{} set DID_LS 0x{:x} DID_MS 0x{:x}", idx, did.ls, did.ms);
            // DID_MS may assert the lock, it must land last
            mmio.write32(did.ls, ls_addr);
            mmio.write32(did.ms, ms_addr);
            Ok(())
        }
        Ok(OwnerAction::Keep) => Ok(()),
        Err(err) => {
            cprintln!("[jr] JR{} locked to DID_MS 0x{:x}, want 0x{:x}", idx, did_ms, did.ms);
            Err(err)
        }
    }
}

/// Register the DID registers of a job ring with the power backup registry
///
/// # Arguments
///
/// * `pwr`       - Power backup registry
/// * `ctrl_base` - Controller register block base address
/// * `jr_offset` - Job ring register block offset
pub fn prepare_backup(pwr: &mut PwrBackup, ctrl_base: usize, jr_offset: usize) -> CaamResult<()> {
    let idx = jr_index(jr_offset)?;
    let base = ctrl_base
        .checked_add(idx * JRXDID_SIZE)
        .ok_or(CaamError::DRIVER_JR_INVALID_OFFSET)?;
    pwr.add_backup(base, &JRCFG_BACKUP)
}
