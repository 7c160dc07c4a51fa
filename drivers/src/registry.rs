/*++

Licensed under the Apache-2.0 license.

File Name:

    registry.rs

Abstract:

    File contains the capability registry resolving, per capability class,
    which backend implementation services a request.

--*/

use core::fmt;

use crate::blob::BlobBackend;
use crate::hash::{HashAlgorithm, HashBackend, HashKeyOp};
use crate::{caam_trace, CaamError, CaamResult};

/// Namespace of the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityClass {
    Hash,
    Hmac,
    Cipher,
    Blob,
}

impl CapabilityClass {
    const COUNT: usize = 4;

    const fn index(self) -> usize {
        match self {
            CapabilityClass::Hash => 0,
            CapabilityClass::Hmac => 1,
            CapabilityClass::Cipher => 2,
            CapabilityClass::Blob => 3,
        }
    }
}

/// Implementation kind of a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImplKind {
    /// Controller engine
    Hardware,

    /// Software library
    Software,
}

impl ImplKind {
    const fn index(self) -> usize {
        match self {
            ImplKind::Hardware => 0,
            ImplKind::Software => 1,
        }
    }
}

/// Non-owning reference to a statically allocated backend
#[derive(Clone, Copy)]
pub enum Backend {
    Hash(&'static dyn HashBackend),
    Blob(&'static dyn BlobBackend),
}

impl Backend {
    pub fn kind(&self) -> ImplKind {
        match self {
            Backend::Hash(hash) => hash.kind(),
            Backend::Blob(blob) => blob.kind(),
        }
    }

    /// Whether the backend provides the operations of `class`
    fn serves(&self, class: CapabilityClass) -> bool {
        match (self, class) {
            (Backend::Hash(hash), CapabilityClass::Hash) => {
                HashAlgorithm::ALL.iter().any(|algo| hash.supports(*algo))
            }
            (Backend::Hash(hash), CapabilityClass::Hmac) => hash.compute_key().is_some(),
            (Backend::Blob(_), CapabilityClass::Blob) => true,
            _ => false,
        }
    }

    fn addr(&self) -> *const () {
        match self {
            Backend::Hash(hash) => (*hash as *const dyn HashBackend).cast(),
            Backend::Blob(blob) => (*blob as *const dyn BlobBackend).cast(),
        }
    }
}

/// Two descriptors are equal when they reference the same backend object.
impl PartialEq for Backend {
    fn eq(&self, other: &Self) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
            && self.addr() == other.addr()
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Hash(_) => write!(f, "Backend::Hash({:?}, {:p})", self.kind(), self.addr()),
            Backend::Blob(_) => write!(f, "Backend::Blob({:?}, {:p})", self.kind(), self.addr()),
        }
    }
}

/// Table of backends, one slot per capability class and implementation kind
///
/// Backends are registered during bring-up, before the first resolve.
#[derive(Debug)]
pub struct CapabilityRegistry {
    slots: [[Option<Backend>; 2]; CapabilityClass::COUNT],
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityRegistry {
    pub const fn new() -> Self {
        Self {
            slots: [[None; 2]; CapabilityClass::COUNT],
        }
    }

    /// Register a backend in the slot of `class` matching its kind
    ///
    /// # Arguments
    ///
    /// * `class`   - Capability class
    /// * `backend` - Backend descriptor
    ///
    /// # Returns
    ///
    /// * `CaamResult<()>` - `DRIVER_REGISTRY_MALFORMED_BACKEND` if the backend
    ///   does not provide the class, `DRIVER_REGISTRY_ALREADY_REGISTERED` if
    ///   the slot is taken
    pub fn register(&mut self, class: CapabilityClass, backend: Backend) -> CaamResult<()> {
        if !backend.serves(class) {
            return Err(CaamError::DRIVER_REGISTRY_MALFORMED_BACKEND);
        }

        let kind = backend.kind();
        let slot = &mut self.slots[class.index()][kind.index()];
        if slot.is_some() {
            return Err(CaamError::DRIVER_REGISTRY_ALREADY_REGISTERED);
        }

        caam_trace!("[registry] class {} kind {} registered", class.index(), kind.index());
        *slot = Some(backend);
        Ok(())
    }

    /// Backend registered for `class` and `kind`
    pub fn resolve(&self, class: CapabilityClass, kind: ImplKind) -> CaamResult<Backend> {
        self.slots[class.index()][kind.index()].ok_or(CaamError::DRIVER_REGISTRY_NOT_FOUND)
    }

    /// Hash backend servicing `algo`. The hardware backend is authoritative
    /// for the algorithms it supports, software covers the rest.
    ///
    /// # Returns
    ///
    /// * `CaamResult<&'static dyn HashBackend>` - `DRIVER_HASH_NOT_IMPLEMENTED`
    ///   if no registered backend supports `algo`
    pub fn resolve_hash(&self, algo: HashAlgorithm) -> CaamResult<&'static dyn HashBackend> {
        [ImplKind::Hardware, ImplKind::Software]
            .into_iter()
            .find_map(|kind| match self.resolve(CapabilityClass::Hash, kind) {
                Ok(Backend::Hash(hash)) if hash.supports(algo) => Some(hash),
                _ => None,
            })
            .ok_or(CaamError::DRIVER_HASH_NOT_IMPLEMENTED)
    }

    /// Keyed operation servicing `algo`. Backends registered under
    /// `CapabilityClass::Hmac` are looked up first, hardware then software;
    /// otherwise the keyed variant of the hash backend resolved for `algo`
    /// is used.
    ///
    /// # Returns
    ///
    /// * `CaamResult<..>` - `DRIVER_REGISTRY_NO_KEYED_HASH` if no keyed
    ///   backend services `algo`
    pub fn resolve_keyed_hash(
        &self,
        algo: HashAlgorithm,
    ) -> CaamResult<(&'static dyn HashBackend, &'static dyn HashKeyOp)> {
        let keyed = [ImplKind::Hardware, ImplKind::Software]
            .into_iter()
            .find_map(|kind| match self.resolve(CapabilityClass::Hmac, kind) {
                Ok(Backend::Hash(hash)) if hash.supports(algo) => {
                    hash.compute_key().map(|key_op| (hash, key_op))
                }
                _ => None,
            });
        if let Some(keyed) = keyed {
            return Ok(keyed);
        }

        let hash = self.resolve_hash(algo)?;
        let key_op = hash
            .compute_key()
            .ok_or(CaamError::DRIVER_REGISTRY_NO_KEYED_HASH)?;
        Ok((hash, key_op))
    }

    /// Blob backend, hardware first
    pub fn resolve_blob(&self) -> CaamResult<&'static dyn BlobBackend> {
        [ImplKind::Hardware, ImplKind::Software]
            .into_iter()
            .find_map(|kind| match self.resolve(CapabilityClass::Blob, kind) {
                Ok(Backend::Blob(blob)) => Some(blob),
                _ => None,
            })
            .ok_or(CaamError::DRIVER_REGISTRY_NOT_FOUND)
    }

    /// Empty every slot
    pub fn reset(&mut self) {
        self.slots = [[None; 2]; CapabilityClass::COUNT];
    }
}
