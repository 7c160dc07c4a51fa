/*++

Licensed under the Apache-2.0 license.

File Name:

    hash_kat.rs

Abstract:

    File contains the Known Answer Tests (KAT) for the hash backends
    resolved through the capability registry.

--*/

use caam_drivers::printer::HexBytes;
use caam_drivers::{
    cprintln, CapabilityRegistry, HashAlgorithm, HashBackend, HashContext, MAX_DIGEST_SIZE,
};
use caam_error::{CaamError, CaamResult};

struct HashVector {
    algo: HashAlgorithm,
    msg: &'static [u8],
    digest: &'static [u8],
}

// Test vector source:
// https://csrc.nist.gov/projects/cryptographic-standards-and-guidelines/example-values
// (one-block message "abc"); RFC 1321 for MD5
const VECTORS: [HashVector; 6] = [
    HashVector {
        algo: HashAlgorithm::Md5,
        msg: b"abc",
        digest: &[
            0x90, 0x01, 0x50, 0x98, 0x3c, 0xd2, 0x4f, 0xb0, 0xd6, 0x96, 0x3f, 0x7d, 0x28, 0xe1,
            0x7f, 0x72,
        ],
    },
    HashVector {
        algo: HashAlgorithm::Sha1,
        msg: b"abc",
        digest: &[
            0xa9, 0x99, 0x3e, 0x36, 0x47, 0x06, 0x81, 0x6a, 0xba, 0x3e, 0x25, 0x71, 0x78, 0x50,
            0xc2, 0x6c, 0x9c, 0xd0, 0xd8, 0x9d,
        ],
    },
    HashVector {
        algo: HashAlgorithm::Sha224,
        msg: b"abc",
        digest: &[
            0x23, 0x09, 0x7d, 0x22, 0x34, 0x05, 0xd8, 0x22, 0x86, 0x42, 0xa4, 0x77, 0xbd, 0xa2,
            0x55, 0xb3, 0x2a, 0xad, 0xbc, 0xe4, 0xbd, 0xa0, 0xb3, 0xf7, 0xe3, 0x6c, 0x9d, 0xa7,
        ],
    },
    HashVector {
        algo: HashAlgorithm::Sha256,
        msg: b"abc",
        digest: &[
            0xba, 0x78, 0x16, 0xbf, 0x8f, 0x01, 0xcf, 0xea, 0x41, 0x41, 0x40, 0xde, 0x5d, 0xae,
            0x22, 0x23, 0xb0, 0x03, 0x61, 0xa3, 0x96, 0x17, 0x7a, 0x9c, 0xb4, 0x10, 0xff, 0x61,
            0xf2, 0x00, 0x15, 0xad,
        ],
    },
    HashVector {
        algo: HashAlgorithm::Sha384,
        msg: b"abc",
        digest: &[
            0xcb, 0x00, 0x75, 0x3f, 0x45, 0xa3, 0x5e, 0x8b, 0xb5, 0xa0, 0x3d, 0x69, 0x9a, 0xc6,
            0x50, 0x07, 0x27, 0x2c, 0x32, 0xab, 0x0e, 0xde, 0xd1, 0x63, 0x1a, 0x8b, 0x60, 0x5a,
            0x43, 0xff, 0x5b, 0xed, 0x80, 0x86, 0x07, 0x2b, 0xa1, 0xe7, 0xcc, 0x23, 0x58, 0xba,
            0xec, 0xa1, 0x34, 0xc8, 0x25, 0xa7,
        ],
    },
    HashVector {
        algo: HashAlgorithm::Sha512,
        msg: b"abc",
        digest: &[
            0xdd, 0xaf, 0x35, 0xa1, 0x93, 0x61, 0x7a, 0xba, 0xcc, 0x41, 0x73, 0x49, 0xae, 0x20,
            0x41, 0x31, 0x12, 0xe6, 0xfa, 0x4e, 0x89, 0xa9, 0x7e, 0xa2, 0x0a, 0x9e, 0xee, 0xe6,
            0x4b, 0x55, 0xd3, 0x9a, 0x21, 0x92, 0x99, 0x2a, 0x27, 0x4f, 0xc1, 0xa8, 0x36, 0xba,
            0x3c, 0x23, 0xa3, 0xfe, 0xeb, 0xbd, 0x45, 0x4d, 0x44, 0x23, 0x64, 0x3c, 0xe8, 0x0e,
            0x2a, 0x9a, 0xc9, 0x4f, 0xa5, 0x4c, 0xa4, 0x9f,
        ],
    },
];

#[derive(Default, Debug)]
pub struct HashKat {}

impl HashKat {
    /// This function executes the Known Answer Tests (aka KAT) for every hash
    /// algorithm with a registered backend.
    ///
    /// # Arguments
    ///
    /// * `registry` - Capability registry the backends are resolved from
    ///
    /// # Returns
    ///
    /// * `CaamResult` - Result denoting the KAT outcome.
    pub fn execute(&self, registry: &CapabilityRegistry) -> CaamResult<()> {
        for vector in VECTORS.iter() {
            let backend = match registry.resolve_hash(vector.algo) {
                Ok(backend) => backend,
                Err(err) if err == CaamError::DRIVER_HASH_NOT_IMPLEMENTED => {
                    cprintln!("[kat] {} skipped", vector.algo.name());
                    continue;
                }
                Err(err) => return Err(err),
            };
            self.kat_digest(backend, vector)?;
            self.kat_split_truncated(backend, vector)?;
        }
        Ok(())
    }

    fn kat_digest(&self, backend: &dyn HashBackend, vector: &HashVector) -> CaamResult<()> {
        let algo = vector.algo;
        let mut digest = [0u8; MAX_DIGEST_SIZE];
        let digest = &mut digest[..algo.digest_size()];

        with_ctx(backend, algo, |ctx| {
            backend.init(ctx, algo)?;
            backend.update(ctx, algo, vector.msg)?;
            backend.finalize(ctx, algo, &mut digest[..])
        })?;

        if digest[..] != vector.digest[..] {
            cprintln!("[kat] {} digest mismatch: {}", algo.name(), HexBytes(&digest[..]));
            return Err(CaamError::KAT_HASH_DIGEST_MISMATCH);
        }
        Ok(())
    }

    /// Hash the message in two halves, the second on a copy of the state,
    /// into a buffer half the digest size.
    fn kat_split_truncated(
        &self,
        backend: &dyn HashBackend,
        vector: &HashVector,
    ) -> CaamResult<()> {
        let algo = vector.algo;
        let (head, tail) = vector.msg.split_at(vector.msg.len() / 2);
        let mut digest = [0u8; MAX_DIGEST_SIZE];
        let digest = &mut digest[..algo.digest_size() / 2];

        with_ctx(backend, algo, |first| {
            backend.init(first, algo)?;
            backend.update(first, algo, head)?;
            with_ctx(backend, algo, |second| {
                backend.copy_state(second, first)?;
                backend.update(second, algo, tail)?;
                backend.finalize(second, algo, &mut digest[..])
            })
        })?;

        if digest[..] != vector.digest[..digest.len()] {
            cprintln!(
                "[kat] {} truncated digest mismatch: {}",
                algo.name(),
                HexBytes(&digest[..])
            );
            return Err(CaamError::KAT_HASH_TRUNCATED_MISMATCH);
        }
        Ok(())
    }
}

/// Run `f` on a fresh context, releasing it whatever the outcome.
fn with_ctx(
    backend: &dyn HashBackend,
    algo: HashAlgorithm,
    f: impl FnOnce(&mut HashContext) -> CaamResult<()>,
) -> CaamResult<()> {
    let mut ctx = backend.alloc_ctx(algo)?;
    let result = f(&mut ctx);
    backend.free_ctx(ctx);
    result
}
