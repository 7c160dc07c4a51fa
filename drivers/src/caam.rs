/*++

Licensed under the Apache-2.0 license.

File Name:

    caam.rs

Abstract:

    File contains the controller driver context created at bring-up.

--*/

use crate::jr::{self, JobRingOwner};
use crate::pwr::PwrBackup;
use crate::registry::CapabilityRegistry;
use crate::{cprintln, CaamConfig, CaamError, CaamResult};
use caam_mmio::MmioMut;

/// Controller driver context
///
/// Owns the register bus and the process-wide tables of the driver. Bring-up
/// registers backends and job rings through `&mut self`; operation and the
/// suspend/resume transition follow.
pub struct Caam<M: MmioMut> {
    mmio: M,
    ctrl_base: usize,
    cfg: CaamConfig,
    registry: CapabilityRegistry,
    pwr: PwrBackup,
}

impl<M: MmioMut> Caam<M> {
    /// Create the driver context
    ///
    /// # Arguments
    ///
    /// * `mmio`      - Register bus
    /// * `ctrl_base` - Controller register block base address
    /// * `cfg`       - Driver configuration
    pub fn new(mmio: M, ctrl_base: usize, cfg: CaamConfig) -> Self {
        Self {
            mmio,
            ctrl_base,
            cfg,
            registry: CapabilityRegistry::new(),
            pwr: PwrBackup::new(),
        }
    }

    pub fn mmio(&self) -> &M {
        &self.mmio
    }

    pub fn ctrl_base(&self) -> usize {
        self.ctrl_base
    }

    pub fn config(&self) -> &CaamConfig {
        &self.cfg
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CapabilityRegistry {
        &mut self.registry
    }

    pub fn pwr(&self) -> &PwrBackup {
        &self.pwr
    }

    /// Assign and lock the owner of a job ring, then register its ownership
    /// registers for backup
    ///
    /// # Arguments
    ///
    /// * `jr_offset` - Job ring register block offset
    /// * `owner`     - Owner of the ring
    pub fn init_job_ring(&mut self, jr_offset: usize, owner: &JobRingOwner) -> CaamResult<()> {
        jr::set_owner(&self.mmio, self.ctrl_base, jr_offset, owner, &self.cfg)?;
        jr::prepare_backup(&mut self.pwr, self.ctrl_base, jr_offset)
    }

    /// Initialize the registered blob manager
    ///
    /// # Returns
    ///
    /// * `CaamResult<()>` - `DRIVER_REGISTRY_NOT_FOUND` without a blob
    ///   backend, `DRIVER_BLOB_INIT_FAILURE` if the backend fails
    pub fn init_blob(&self) -> CaamResult<()> {
        let blob = self.registry.resolve_blob()?;
        blob.init(self.ctrl_base).map_err(|err| {
            cprintln!("[caam] blob init failed: 0x{:x}", u32::from(err));
            CaamError::DRIVER_BLOB_INIT_FAILURE
        })
    }

    /// Save the registered registers before power loss
    pub fn suspend(&mut self) -> CaamResult<()> {
        self.pwr.do_backup(&self.mmio)
    }

    /// Restore the registered registers after power is back
    pub fn resume(&mut self) -> CaamResult<()> {
        self.pwr.do_restore(&self.mmio)
    }
}
