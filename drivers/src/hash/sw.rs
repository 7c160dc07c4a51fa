/*++

Licensed under the Apache-2.0 license.

File Name:

    sw.rs

Abstract:

    File contains the software hash backend, servicing every digest
    algorithm not claimed by a hardware engine at build time.

--*/

use core::sync::atomic::{AtomicUsize, Ordering};

use bitflags::bitflags;
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

use super::{HashAlgorithm, HashBackend, HashContext, HashPhase, MAX_DIGEST_SIZE};
use crate::registry::{Backend, CapabilityClass, CapabilityRegistry, ImplKind};
use crate::{caam_trace, cprintln, CaamError, CaamResult};

bitflags! {
    /// Set of digest algorithms serviced in software
    pub struct SwHashAlgos: u32 {
        const MD5 = 1 << 0;
        const SHA1 = 1 << 1;
        const SHA224 = 1 << 2;
        const SHA256 = 1 << 3;
        const SHA384 = 1 << 4;
        const SHA512 = 1 << 5;
    }
}

impl SwHashAlgos {
    /// Algorithms left to software once the `hw-*` features have claimed
    /// theirs for the hardware engine
    pub const fn configured() -> Self {
        let mut hw = 0;
        if cfg!(feature = "hw-md5") {
            hw |= Self::MD5.bits();
        }
        if cfg!(feature = "hw-sha1") {
            hw |= Self::SHA1.bits();
        }
        if cfg!(feature = "hw-sha224") {
            hw |= Self::SHA224.bits();
        }
        if cfg!(feature = "hw-sha256") {
            hw |= Self::SHA256.bits();
        }
        if cfg!(feature = "hw-sha384") {
            hw |= Self::SHA384.bits();
        }
        if cfg!(feature = "hw-sha512") {
            hw |= Self::SHA512.bits();
        }
        Self::from_bits_truncate(Self::all().bits() & !hw)
    }
}

/// Running digest of one of the software primitives
#[derive(Clone)]
enum SwHashState {
    Md5(Md5),
    Sha1(Sha1),
    Sha224(Sha224),
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
}

impl SwHashState {
    fn process(&mut self, data: &[u8]) {
        match self {
            SwHashState::Md5(h) => h.update(data),
            SwHashState::Sha1(h) => h.update(data),
            SwHashState::Sha224(h) => h.update(data),
            SwHashState::Sha256(h) => h.update(data),
            SwHashState::Sha384(h) => h.update(data),
            SwHashState::Sha512(h) => h.update(data),
        }
    }

    /// Write the digest into `out`, sized to the primitive's hash size, and
    /// reset the running state.
    fn done(&mut self, out: &mut [u8]) {
        match self {
            SwHashState::Md5(h) => out.copy_from_slice(&h.finalize_reset()),
            SwHashState::Sha1(h) => out.copy_from_slice(&h.finalize_reset()),
            SwHashState::Sha224(h) => out.copy_from_slice(&h.finalize_reset()),
            SwHashState::Sha256(h) => out.copy_from_slice(&h.finalize_reset()),
            SwHashState::Sha384(h) => out.copy_from_slice(&h.finalize_reset()),
            SwHashState::Sha512(h) => out.copy_from_slice(&h.finalize_reset()),
        }
    }
}

/// Context state of the software backend, tagged with the backend that
/// allocated it
struct SwHashCtx {
    owner: usize,
    digest: SwHashState,
}

/// Software primitive descriptor
struct SwHashPrimitive {
    algo: HashAlgorithm,
    flag: SwHashAlgos,
    hash_size: usize,
    init: fn() -> SwHashState,
}

static SW_HASH_PRIMITIVES: [SwHashPrimitive; 6] = [
    SwHashPrimitive {
        algo: HashAlgorithm::Md5,
        flag: SwHashAlgos::MD5,
        hash_size: 16,
        init: || SwHashState::Md5(Md5::new()),
    },
    SwHashPrimitive {
        algo: HashAlgorithm::Sha1,
        flag: SwHashAlgos::SHA1,
        hash_size: 20,
        init: || SwHashState::Sha1(Sha1::new()),
    },
    SwHashPrimitive {
        algo: HashAlgorithm::Sha224,
        flag: SwHashAlgos::SHA224,
        hash_size: 28,
        init: || SwHashState::Sha224(Sha224::new()),
    },
    SwHashPrimitive {
        algo: HashAlgorithm::Sha256,
        flag: SwHashAlgos::SHA256,
        hash_size: 32,
        init: || SwHashState::Sha256(Sha256::new()),
    },
    SwHashPrimitive {
        algo: HashAlgorithm::Sha384,
        flag: SwHashAlgos::SHA384,
        hash_size: 48,
        init: || SwHashState::Sha384(Sha384::new()),
    },
    SwHashPrimitive {
        algo: HashAlgorithm::Sha512,
        flag: SwHashAlgos::SHA512,
        hash_size: 64,
        init: || SwHashState::Sha512(Sha512::new()),
    },
];

/// Hash backend built on the software digest library
pub struct SwHashBackend {
    enabled: SwHashAlgos,
    live: AtomicUsize,
}

/// Software backend for the algorithms selected at build time
pub static HASH_SW: SwHashBackend = SwHashBackend::new(SwHashAlgos::configured());

impl SwHashBackend {
    /// Create a backend servicing `enabled`
    pub const fn new(enabled: SwHashAlgos) -> Self {
        Self {
            enabled,
            live: AtomicUsize::new(0),
        }
    }

    pub fn enabled(&self) -> SwHashAlgos {
        self.enabled
    }

    /// Number of contexts allocated and not yet freed
    pub fn live_contexts(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }

    /// Resolve the primitive servicing `algo`
    fn primitive(&self, algo: HashAlgorithm) -> CaamResult<&'static SwHashPrimitive> {
        SW_HASH_PRIMITIVES
            .iter()
            .find(|prim| prim.algo == algo && self.enabled.contains(prim.flag))
            .ok_or(CaamError::DRIVER_HASH_NOT_IMPLEMENTED)
    }

    /// Tag stored in the contexts this backend allocates
    fn tag(&self) -> usize {
        self as *const Self as usize
    }

    /// State of `ctx` if this backend allocated it
    fn owned<'a>(&self, ctx: &'a HashContext) -> CaamResult<&'a SwHashCtx> {
        let state = ctx.state::<SwHashCtx>()?;
        if state.owner != self.tag() {
            return Err(CaamError::DRIVER_HASH_FOREIGN_CONTEXT);
        }
        Ok(state)
    }

    fn owned_mut<'a>(&self, ctx: &'a mut HashContext) -> CaamResult<&'a mut SwHashState> {
        let tag = self.tag();
        let state = ctx.state_mut::<SwHashCtx>()?;
        if state.owner != tag {
            return Err(CaamError::DRIVER_HASH_FOREIGN_CONTEXT);
        }
        Ok(&mut state.digest)
    }

    /// Resolve the primitive for a call on `ctx` and check the context was
    /// allocated by this backend for `algo`.
    fn resolve_for(
        &self,
        ctx: &HashContext,
        algo: HashAlgorithm,
    ) -> CaamResult<&'static SwHashPrimitive> {
        let prim = self.primitive(algo)?;
        self.owned(ctx)?;
        if ctx.algorithm() != algo {
            return Err(CaamError::DRIVER_HASH_ALGO_MISMATCH);
        }
        Ok(prim)
    }
}

impl HashBackend for SwHashBackend {
    fn kind(&self) -> ImplKind {
        ImplKind::Software
    }

    fn supports(&self, algo: HashAlgorithm) -> bool {
        self.primitive(algo).is_ok()
    }

    fn alloc_ctx(&self, algo: HashAlgorithm) -> CaamResult<HashContext> {
        let prim = self.primitive(algo)?;
        let state = SwHashCtx {
            owner: self.tag(),
            digest: (prim.init)(),
        };
        let ctx = HashContext::try_new(algo, state)?;
        self.live.fetch_add(1, Ordering::Relaxed);
        caam_trace!("[hash] sw alloc {}", algo.name());
        Ok(ctx)
    }

    fn free_ctx(&self, ctx: HashContext) {
        caam_trace!("[hash] sw free {}", ctx.algorithm().name());
        if self.owned(&ctx).is_ok() {
            self.live.fetch_sub(1, Ordering::Relaxed);
        } else {
            cprintln!("[hash] sw free of foreign {} context", ctx.algorithm().name());
        }
        drop(ctx);
    }

    fn init(&self, ctx: &mut HashContext, algo: HashAlgorithm) -> CaamResult<()> {
        let prim = self.resolve_for(ctx, algo)?;
        *self.owned_mut(ctx)? = (prim.init)();
        ctx.set_phase(HashPhase::Initialized);
        Ok(())
    }

    fn update(&self, ctx: &mut HashContext, algo: HashAlgorithm, data: &[u8]) -> CaamResult<()> {
        self.resolve_for(ctx, algo)?;
        if !matches!(ctx.phase(), HashPhase::Initialized | HashPhase::Updated) {
            return Err(CaamError::DRIVER_HASH_INVALID_STATE);
        }
        self.owned_mut(ctx)?.process(data);
        ctx.set_phase(HashPhase::Updated);
        Ok(())
    }

    fn finalize(
        &self,
        ctx: &mut HashContext,
        algo: HashAlgorithm,
        digest: &mut [u8],
    ) -> CaamResult<()> {
        let prim = self.resolve_for(ctx, algo)?;
        if !matches!(ctx.phase(), HashPhase::Initialized | HashPhase::Updated) {
            return Err(CaamError::DRIVER_HASH_INVALID_STATE);
        }
        if digest.is_empty() {
            return Err(CaamError::DRIVER_HASH_INVALID_DIGEST_LEN);
        }

        let state = self.owned_mut(ctx)?;
        if digest.len() >= prim.hash_size {
            state.done(&mut digest[..prim.hash_size]);
        } else {
            let mut full = [0u8; MAX_DIGEST_SIZE];
            state.done(&mut full[..prim.hash_size]);
            digest.copy_from_slice(&full[..digest.len()]);
            full.fill(0);
        }
        ctx.set_phase(HashPhase::Finalized);
        Ok(())
    }

    /// A finalized destination must be re-initialized before it can
    /// receive a copy.
    fn copy_state(&self, dst: &mut HashContext, src: &HashContext) -> CaamResult<()> {
        if dst.algorithm() != src.algorithm() {
            return Err(CaamError::DRIVER_HASH_ALGO_MISMATCH);
        }
        if dst.phase() == HashPhase::Finalized {
            return Err(CaamError::DRIVER_HASH_INVALID_STATE);
        }
        let digest = self.owned(src)?.digest.clone();
        *self.owned_mut(dst)? = digest;
        dst.set_phase(src.phase());
        Ok(())
    }
}

/// Install the software hash backend into the registry. Nothing is
/// installed when every algorithm is claimed by the hardware engine.
///
/// # Arguments
///
/// * `registry` - Capability registry under bring-up
pub fn register(registry: &mut CapabilityRegistry) -> CaamResult<()> {
    if HASH_SW.enabled().is_empty() {
        return Ok(());
    }
    registry.register(CapabilityClass::Hash, Backend::Hash(&HASH_SW))
}
