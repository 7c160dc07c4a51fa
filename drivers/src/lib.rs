/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the CAAM driver core library.

--*/

#![cfg_attr(not(any(feature = "std", test)), no_std)]

extern crate alloc;

mod reg;

pub mod blob;
mod caam;
mod config;
pub mod hash;
pub mod jr;
pub mod printer;
pub mod pwr;
pub mod registry;

pub use blob::{BlobBackend, BLOB_BKEK_SIZE, BLOB_KEY_MODIFIER_SIZE};
pub use caam::Caam;
pub use caam_error::{CaamError, CaamResult, TeeStatus};
pub use caam_mmio::{Mmio, MmioMut, RealMmio, RegWidth};
pub use config::CaamConfig;
pub use hash::sw::{SwHashAlgos, SwHashBackend, HASH_SW};
pub use hash::{HashAlgorithm, HashBackend, HashContext, HashKeyOp, HashPhase, MAX_DIGEST_SIZE};
pub use jr::{DidConfig, JobRingOwner, JrOwnerWord, LockState, OwnerAction};
pub use pwr::{PwrBackup, RegList};
pub use registry::{Backend, CapabilityClass, CapabilityRegistry, ImplKind};
