// Licensed under the Apache-2.0 license

use std::sync::atomic::{AtomicUsize, Ordering};

use caam_drivers::hash::sw;
use caam_drivers::{
    Backend, BlobBackend, Caam, CaamConfig, CaamError, CaamResult, CapabilityClass,
    HashAlgorithm, HashBackend, JobRingOwner, TeeStatus,
};
use caam_hw_model::{ModelMmio, WriteLock};

const CTRL_BASE: usize = 0x3090_0000;

const GRANT: CaamConfig = CaamConfig {
    sw_crypto_grant: true,
};

fn did_ms_addr(idx: usize) -> usize {
    CTRL_BASE + 0x10 + 8 * idx
}

fn did_ls_addr(idx: usize) -> usize {
    CTRL_BASE + 0x14 + 8 * idx
}

fn new_caam() -> Caam<ModelMmio> {
    let mut mmio = ModelMmio::new();
    for idx in 0..4 {
        mmio.add_write_lock(WriteLock {
            lock_addr: did_ms_addr(idx),
            lock_mask: 1 << 31,
            protected: vec![did_ms_addr(idx), did_ls_addr(idx)],
        });
    }
    Caam::new(mmio, CTRL_BASE, GRANT)
}

struct CountingBlob {
    fail: bool,
    calls: AtomicUsize,
    last_base: AtomicUsize,
}

impl BlobBackend for CountingBlob {
    fn init(&self, ctrl_base: usize) -> CaamResult<()> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.last_base.store(ctrl_base, Ordering::Relaxed);
        if self.fail {
            Err(CaamError::DRIVER_REGISTRY_NOT_FOUND)
        } else {
            Ok(())
        }
    }
}

static BLOB_OK: CountingBlob = CountingBlob {
    fail: false,
    calls: AtomicUsize::new(0),
    last_base: AtomicUsize::new(0),
};

static BLOB_FAIL: CountingBlob = CountingBlob {
    fail: true,
    calls: AtomicUsize::new(0),
    last_base: AtomicUsize::new(0),
};

#[test]
fn test_job_rings_survive_suspend() {
    let mut caam = new_caam();
    let owners = [
        JobRingOwner::secure(1).unwrap(),
        JobRingOwner::non_secure(2).unwrap(),
        JobRingOwner::non_secure(3).unwrap(),
        JobRingOwner::secure(5).unwrap(),
    ];
    for (idx, owner) in owners.iter().enumerate() {
        caam.init_job_ring(0x1000 * (idx + 1), owner).unwrap();
    }
    assert_eq!(caam.pwr().len(), 4);
    let configured = caam.mmio().snapshot();

    assert_eq!(caam.suspend(), Ok(()));
    caam.mmio().power_cycle();
    assert_eq!(caam.mmio().peek32(did_ms_addr(0)), 0);

    caam.mmio().log.take();
    assert_eq!(caam.resume(), Ok(()));
    assert_eq!(caam.mmio().snapshot(), configured);

    // Each ring replays DID_LS before the DID_MS that carries the lock
    let writes = caam.mmio().log.writes();
    assert_eq!(writes.len(), 8);
    for idx in 0..4 {
        assert!(writes[2 * idx].starts_with(&format!("write32({:#x},", did_ls_addr(idx))));
        assert!(writes[2 * idx + 1].starts_with(&format!("write32({:#x},", did_ms_addr(idx))));
    }

    // Ownership is locked again after resume
    assert_eq!(
        caam.init_job_ring(0x1000, &JobRingOwner::secure(2).unwrap()),
        Err(CaamError::DRIVER_JR_OWNER_LOCKED_MISMATCH)
    );
}

#[test]
fn test_failed_job_ring_is_not_backed_up() {
    let mut caam = new_caam();
    caam.mmio().poke32(0x8000_0000, did_ms_addr(1));

    let result = caam.init_job_ring(0x2000, &JobRingOwner::secure(1).unwrap());
    assert_eq!(TeeStatus::from(result), TeeStatus::GenericFailure);
    assert_eq!(
        caam.init_job_ring(0x2100, &JobRingOwner::secure(1).unwrap()),
        Err(CaamError::DRIVER_JR_INVALID_OFFSET)
    );
    assert!(caam.pwr().is_empty());
}

#[test]
fn test_resume_without_suspend() {
    let mut caam = new_caam();
    caam.init_job_ring(0x1000, &JobRingOwner::secure(1).unwrap())
        .unwrap();
    assert_eq!(caam.resume(), Err(CaamError::DRIVER_PWR_NO_SNAPSHOT));
}

#[test]
fn test_init_blob() {
    let mut caam = new_caam();
    assert_eq!(caam.init_blob(), Err(CaamError::DRIVER_REGISTRY_NOT_FOUND));

    caam.registry_mut()
        .register(CapabilityClass::Blob, Backend::Blob(&BLOB_OK))
        .unwrap();
    assert_eq!(caam.init_blob(), Ok(()));
    assert_eq!(BLOB_OK.calls.load(Ordering::Relaxed), 1);
    assert_eq!(BLOB_OK.last_base.load(Ordering::Relaxed), CTRL_BASE);
}

#[test]
fn test_init_blob_failure() {
    let mut caam = new_caam();
    caam.registry_mut()
        .register(CapabilityClass::Blob, Backend::Blob(&BLOB_FAIL))
        .unwrap();
    assert_eq!(caam.init_blob(), Err(CaamError::DRIVER_BLOB_INIT_FAILURE));
    assert_eq!(BLOB_FAIL.calls.load(Ordering::Relaxed), 1);
}

#[test]
fn test_registry_through_context() {
    let mut caam = new_caam();
    sw::register(caam.registry_mut()).unwrap();
    assert_eq!(caam.config(), &GRANT);
    assert_eq!(caam.ctrl_base(), CTRL_BASE);

    for algo in HashAlgorithm::ALL {
        let hash = caam.registry().resolve_hash(algo);
        if sw::HASH_SW.supports(algo) {
            assert!(hash.is_ok());
        } else {
            assert_eq!(hash.err(), Some(CaamError::DRIVER_HASH_NOT_IMPLEMENTED));
        }
    }
}
