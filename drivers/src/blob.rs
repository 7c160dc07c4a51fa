/*++

Licensed under the Apache-2.0 license.

File Name:

    blob.rs

Abstract:

    File contains the interface of the blob (secure key encapsulation)
    manager backend.

--*/

use crate::{CaamResult, ImplKind};

/// Blob key modifier size in bytes
pub const BLOB_KEY_MODIFIER_SIZE: usize = 16;

/// Blob key encryption key (BKEK) size in bytes
pub const BLOB_BKEK_SIZE: usize = 32;

/// Blob manager backend
pub trait BlobBackend: Sync {
    fn kind(&self) -> ImplKind {
        ImplKind::Hardware
    }

    /// Initialize the blob manager
    ///
    /// # Arguments
    ///
    /// * `ctrl_base` - Controller register block base address
    fn init(&self, ctrl_base: usize) -> CaamResult<()>;
}
