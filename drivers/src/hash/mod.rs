/*++

Licensed under the Apache-2.0 license.

File Name:

    mod.rs

Abstract:

    File contains the lifecycle contract every hash backend implements and
    the opaque per-operation context handed to callers.

--*/

pub mod sw;

use alloc::alloc::{alloc, Layout};
use alloc::boxed::Box;
use core::any::Any;

use crate::{CaamError, CaamResult, ImplKind};

/// Largest digest produced by any supported algorithm
pub const MAX_DIGEST_SIZE: usize = 64;

/// Hash algorithm identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 6] = [
        HashAlgorithm::Md5,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha224,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha384,
        HashAlgorithm::Sha512,
    ];

    /// Native digest size in bytes
    pub const fn digest_size(self) -> usize {
        match self {
            HashAlgorithm::Md5 => 16,
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha224 => 28,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha224 => "sha224",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }
}

/// Lifecycle phase of a hash context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashPhase {
    /// Allocated, or left unusable by a failed operation; needs `init`
    Allocated,

    Initialized,

    /// At least one `update` since `init`
    Updated,

    /// Digest produced; only `init` is legal
    Finalized,
}

/// Per-operation hash state owned by the caller.
///
/// The context records the algorithm it was allocated for; its state is
/// private to the backend that allocated it.
pub struct HashContext {
    algo: HashAlgorithm,
    phase: HashPhase,
    state: Box<dyn Any + Send>,
}

impl HashContext {
    /// Allocate a context holding a backend state
    ///
    /// # Arguments
    ///
    /// * `algo`  - Algorithm the context is allocated for
    /// * `state` - Backend private state
    ///
    /// # Returns
    ///
    /// * `CaamResult<HashContext>` - `DRIVER_HASH_OUT_OF_MEMORY` if the heap
    ///   cannot hold the state
    pub fn try_new<S: Any + Send>(algo: HashAlgorithm, state: S) -> CaamResult<Self> {
        let state = try_box(state).ok_or(CaamError::DRIVER_HASH_OUT_OF_MEMORY)?;
        Ok(Self {
            algo,
            phase: HashPhase::Allocated,
            state,
        })
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algo
    }

    pub fn phase(&self) -> HashPhase {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: HashPhase) {
        self.phase = phase;
    }

    /// Backend state, if this context holds state of type `S`
    pub fn state<S: Any>(&self) -> CaamResult<&S> {
        self.state
            .downcast_ref::<S>()
            .ok_or(CaamError::DRIVER_HASH_FOREIGN_CONTEXT)
    }

    /// Mutable backend state, if this context holds state of type `S`
    pub fn state_mut<S: Any>(&mut self) -> CaamResult<&mut S> {
        self.state
            .downcast_mut::<S>()
            .ok_or(CaamError::DRIVER_HASH_FOREIGN_CONTEXT)
    }
}

/// Heap-allocate `val`, reporting allocation failure instead of aborting.
fn try_box<S>(val: S) -> Option<Box<S>> {
    let layout = Layout::new::<S>();
    if layout.size() == 0 {
        return Some(Box::new(val));
    }

    // SAFETY: the layout has a non-zero size.
    let ptr = unsafe { alloc(layout) }.cast::<S>();
    if ptr.is_null() {
        return None;
    }

    // SAFETY: `ptr` is non-null and was returned by the global allocator for
    // the layout of `S`, which is what `Box` expects to free.
    unsafe {
        ptr.write(val);
        Some(Box::from_raw(ptr))
    }
}

/// Keyed (MAC) hash capability, offered only by keyed backends
pub trait HashKeyOp {
    /// Load `key` into an initialized context
    fn compute_key(&self, ctx: &mut HashContext, key: &[u8]) -> CaamResult<()>;
}

/// Contract of a hash backend
///
/// A context is only valid with the backend that allocated it, and the
/// algorithm passed to every call must be the one it was allocated for.
pub trait HashBackend: Sync {
    /// Hardware engine or software library
    fn kind(&self) -> ImplKind;

    /// Whether `algo` is serviced by this backend
    fn supports(&self, algo: HashAlgorithm) -> bool;

    /// Allocate a context for `algo`
    fn alloc_ctx(&self, algo: HashAlgorithm) -> CaamResult<HashContext>;

    /// Release a context
    fn free_ctx(&self, ctx: HashContext);

    /// Start a new digest operation
    fn init(&self, ctx: &mut HashContext, algo: HashAlgorithm) -> CaamResult<()>;

    /// Absorb `data`
    fn update(&self, ctx: &mut HashContext, algo: HashAlgorithm, data: &[u8])
        -> CaamResult<()>;

    /// Produce the digest. A buffer shorter than the native digest size
    /// receives the leading bytes of the digest.
    fn finalize(&self, ctx: &mut HashContext, algo: HashAlgorithm, digest: &mut [u8])
        -> CaamResult<()>;

    /// Duplicate the state of `src` into `dst`
    fn copy_state(&self, dst: &mut HashContext, src: &HashContext) -> CaamResult<()>;

    /// Keyed variant, if offered
    fn compute_key(&self) -> Option<&dyn HashKeyOp> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_sizes() {
        for algo in HashAlgorithm::ALL {
            assert!(algo.digest_size() <= MAX_DIGEST_SIZE);
        }
        assert_eq!(HashAlgorithm::Sha256.digest_size(), 32);
        assert_eq!(HashAlgorithm::Sha384.name(), "sha384");
    }

    #[test]
    fn test_context_state_type() {
        let mut ctx = HashContext::try_new(HashAlgorithm::Sha1, 7u64).unwrap();
        assert_eq!(ctx.phase(), HashPhase::Allocated);
        assert_eq!(ctx.state::<u64>(), Ok(&7));
        *ctx.state_mut::<u64>().unwrap() = 9;
        assert_eq!(ctx.state::<u64>(), Ok(&9));
        assert_eq!(
            ctx.state::<u32>().err(),
            Some(CaamError::DRIVER_HASH_FOREIGN_CONTEXT)
        );
    }

    #[test]
    fn test_zero_sized_state() {
        let ctx = HashContext::try_new(HashAlgorithm::Md5, ()).unwrap();
        assert_eq!(ctx.state::<()>(), Ok(&()));
    }
}
