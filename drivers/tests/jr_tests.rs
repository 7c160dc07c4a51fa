// Licensed under the Apache-2.0 license

use caam_drivers::jr::{self, lock_state, set_owner};
use caam_drivers::{
    CaamConfig, CaamError, DidConfig, JobRingOwner, LockState, Mmio, TeeStatus,
};
use caam_hw_model::{ModelMmio, WriteLock};

const CTRL_BASE: usize = 0x3090_0000;

const GRANT: CaamConfig = CaamConfig {
    sw_crypto_grant: true,
};
const NO_GRANT: CaamConfig = CaamConfig {
    sw_crypto_grant: false,
};

fn did_ms_addr(idx: usize) -> usize {
    CTRL_BASE + 0x10 + 8 * idx
}

fn did_ls_addr(idx: usize) -> usize {
    CTRL_BASE + 0x14 + 8 * idx
}

fn jr_offset(idx: usize) -> usize {
    0x1000 * (idx + 1)
}

/// Model where the LDID bit of every ring's DID_MS write-protects the pair.
fn locking_model() -> ModelMmio {
    let mut mmio = ModelMmio::new();
    for idx in 0..4 {
        mmio.add_write_lock(WriteLock {
            lock_addr: did_ms_addr(idx),
            lock_mask: 1 << 31,
            protected: vec![did_ms_addr(idx), did_ls_addr(idx)],
        });
    }
    mmio
}

fn owners() -> Vec<JobRingOwner> {
    vec![
        JobRingOwner::secure(1).unwrap(),
        JobRingOwner::secure(7).unwrap(),
        JobRingOwner::new(1, true, 0x3ff).unwrap(),
        JobRingOwner::non_secure(2).unwrap(),
        JobRingOwner::non_secure(0xf).unwrap(),
    ]
}

#[test]
fn test_set_owner_write_order() {
    let mmio = locking_model();
    let owner = JobRingOwner::secure(1).unwrap();
    let did = DidConfig::for_owner(&owner, &GRANT);

    set_owner(&mmio, CTRL_BASE, jr_offset(2), &owner, &GRANT).unwrap();
    assert_eq!(
        mmio.log.writes(),
        vec![
            format!("write32({:#x}, 0x0)", did_ls_addr(2)),
            format!("write32({:#x}, {:#x})", did_ms_addr(2), did.ms),
        ]
    );
    assert_eq!(mmio.peek32(did_ms_addr(2)), did.ms);
    assert_eq!(mmio.peek32(did_ls_addr(2)), 0);
}

#[test]
fn test_set_owner_idempotent_once_locked() {
    for owner in owners() {
        let mmio = locking_model();
        let offset = jr_offset(0);

        set_owner(&mmio, CTRL_BASE, offset, &owner, &GRANT).unwrap();
        let first = mmio.snapshot();

        mmio.log.take();
        assert_eq!(set_owner(&mmio, CTRL_BASE, offset, &owner, &GRANT), Ok(()));
        assert_eq!(mmio.snapshot(), first);

        if owner.is_secure() {
            assert_eq!(
                lock_state(&mmio, CTRL_BASE, offset, &owner, &GRANT),
                Ok(LockState::LockedMatching)
            );
            assert!(mmio.log.writes().is_empty());
        }
    }
}

#[test]
fn test_set_owner_idempotent_unlocked() {
    let mmio = locking_model();
    let owner = JobRingOwner::secure(3).unwrap();
    let offset = jr_offset(1);

    set_owner(&mmio, CTRL_BASE, offset, &owner, &NO_GRANT).unwrap();
    let first = mmio.snapshot();
    assert_eq!(
        lock_state(&mmio, CTRL_BASE, offset, &owner, &NO_GRANT),
        Ok(LockState::Unlocked)
    );

    mmio.log.take();
    set_owner(&mmio, CTRL_BASE, offset, &owner, &NO_GRANT).unwrap();
    assert_eq!(mmio.log.writes().len(), 2);
    assert_eq!(mmio.snapshot(), first);
}

#[test]
fn test_locked_owner_mismatch() {
    let secure: Vec<JobRingOwner> = owners().into_iter().filter(|o| o.is_secure()).collect();
    for o1 in secure.iter() {
        for o2 in owners().iter().filter(|o2| *o2 != o1) {
            let mmio = locking_model();
            let offset = jr_offset(3);
            set_owner(&mmio, CTRL_BASE, offset, o1, &GRANT).unwrap();
            let locked = mmio.snapshot();

            mmio.log.take();
            let result = set_owner(&mmio, CTRL_BASE, offset, o2, &GRANT);
            assert_eq!(result, Err(CaamError::DRIVER_JR_OWNER_LOCKED_MISMATCH));
            assert_eq!(TeeStatus::from(result), TeeStatus::GenericFailure);
            assert!(mmio.log.writes().is_empty());
            assert_eq!(mmio.snapshot(), locked);
        }
    }
}

#[test]
fn test_locked_with_foreign_ls() {
    let mmio = locking_model();
    let owner = JobRingOwner::secure(1).unwrap();
    let did = DidConfig::for_owner(&owner, &GRANT);
    mmio.poke32(did.ms, did_ms_addr(0));
    mmio.poke32(0x5, did_ls_addr(0));

    assert_eq!(
        lock_state(&mmio, CTRL_BASE, jr_offset(0), &owner, &GRANT),
        Ok(LockState::LockedMismatched)
    );
    assert_eq!(
        set_owner(&mmio, CTRL_BASE, jr_offset(0), &owner, &GRANT),
        Err(CaamError::DRIVER_JR_OWNER_LOCKED_MISMATCH)
    );
    assert_eq!(mmio.read32(did_ls_addr(0)), 0x5);
}

#[test]
fn test_locked_by_lower_level_without_grant() {
    // A secure owner configured without the grant matches a pair latched
    // with LDID only if the rest of DID_MS is identical
    let mmio = locking_model();
    let owner = JobRingOwner::secure(4).unwrap();
    let did = DidConfig::for_owner(&owner, &NO_GRANT);
    mmio.poke32(did.ms | (1 << 31), did_ms_addr(1));

    assert_eq!(
        set_owner(&mmio, CTRL_BASE, jr_offset(1), &owner, &NO_GRANT),
        Ok(())
    );
    assert!(mmio.log.writes().is_empty());
}

#[test]
fn test_invalid_ring_offset() {
    let mmio = locking_model();
    let owner = JobRingOwner::secure(1).unwrap();
    for offset in [0, 0x800, 0x1004, 0x5000, usize::MAX] {
        assert_eq!(
            set_owner(&mmio, CTRL_BASE, offset, &owner, &GRANT),
            Err(CaamError::DRIVER_JR_INVALID_OFFSET)
        );
    }
    assert!(mmio.log.as_str().is_empty());
    assert_eq!(jr::jr_index(jr_offset(3)), Ok(3));
}
