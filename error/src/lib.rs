/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains the error codes and status taxonomy used by the CAAM
    resource control core.

--*/
#![cfg_attr(not(any(feature = "std", test)), no_std)]
use core::convert::From;
use core::num::{NonZeroU32, TryFromIntError};

/// CAAM Error Type
/// Derives debug, copy, clone, eq, and partial eq
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CaamError(pub NonZeroU32);

/// Status reported across the TEE boundary.
///
/// Every [`CaamError`] collapses onto exactly one of the failure variants.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TeeStatus {
    Success,
    GenericFailure,
    NotImplemented,
    OutOfMemory,
    BadParameters,
}

/// Macro to define error constants ensuring uniqueness
///
/// This macro takes a list of (name, value, status, doc) tuples and generates
/// constant definitions for each error code, together with the mapping from
/// code to [`TeeStatus`].
#[macro_export]
macro_rules! define_error_constants {
    ($(($name:ident, $value:expr, $status:ident, $doc:expr)),* $(,)?) => {
        $(
            #[doc = $doc]
            pub const $name: CaamError = CaamError::new_const($value);
        )*

        /// Map the error code onto the TEE status taxonomy.
        ///
        /// Codes not defined by this crate are reported as
        /// `TeeStatus::GenericFailure`.
        pub fn status(self) -> TeeStatus {
            $(
                if self.0.get() == $value {
                    return TeeStatus::$status;
                }
            )*
            TeeStatus::GenericFailure
        }

        #[cfg(test)]
        /// Returns a vector of all defined error constants for testing uniqueness
        pub fn all_constants() -> Vec<(&'static str, u32)> {
            vec![
                $(
                    (stringify!($name), $value),
                )*
            ]
        }
    };
}

impl CaamError {
    /// Create a CAAM error; intended to only be used from const contexts, as we don't want
    /// runtime panics if val is zero. The preferred way to get a CaamError from a u32 is to
    /// use `CaamError::try_from()` from the `TryFrom` trait impl.
    const fn new_const(val: u32) -> Self {
        match NonZeroU32::new(val) {
            Some(val) => Self(val),
            None => panic!("CaamError cannot be 0"),
        }
    }

    define_error_constants![
        (
            DRIVER_PWR_INVALID_ENTRY,
            0x0001_0001,
            BadParameters,
            "Power backup entry is malformed"
        ),
        (
            DRIVER_PWR_ADDR_MISALIGNED,
            0x0001_0002,
            BadParameters,
            "Power backup register address not aligned to its width"
        ),
        (
            DRIVER_PWR_ADDR_OVERFLOW,
            0x0001_0003,
            BadParameters,
            "Power backup register address overflows"
        ),
        (
            DRIVER_PWR_OUT_OF_MEMORY,
            0x0001_0004,
            OutOfMemory,
            "Power backup snapshot buffer allocation failed"
        ),
        (
            DRIVER_PWR_NO_SNAPSHOT,
            0x0001_0005,
            GenericFailure,
            "Power restore requested for an entry that was never backed up"
        ),
        (
            DRIVER_JR_INVALID_OFFSET,
            0x0002_0001,
            BadParameters,
            "Job ring offset does not address a job ring"
        ),
        (
            DRIVER_JR_INVALID_OWNER,
            0x0002_0002,
            BadParameters,
            "Job ring owner DID or ICID out of range"
        ),
        (
            DRIVER_JR_OWNER_LOCKED_MISMATCH,
            0x0002_0003,
            GenericFailure,
            "Job ring ownership is locked to a different owner"
        ),
        (
            DRIVER_REGISTRY_ALREADY_REGISTERED,
            0x0003_0001,
            GenericFailure,
            "A backend is already registered for this capability"
        ),
        (
            DRIVER_REGISTRY_MALFORMED_BACKEND,
            0x0003_0002,
            BadParameters,
            "Backend does not provide the capabilities of its class"
        ),
        (
            DRIVER_REGISTRY_NOT_FOUND,
            0x0003_0003,
            NotImplemented,
            "No backend registered for this capability"
        ),
        (
            DRIVER_REGISTRY_NO_KEYED_HASH,
            0x0003_0004,
            NotImplemented,
            "Resolved hash backend does not offer compute_key"
        ),
        (
            DRIVER_HASH_NOT_IMPLEMENTED,
            0x0004_0001,
            NotImplemented,
            "Hash algorithm not implemented by this backend"
        ),
        (
            DRIVER_HASH_OUT_OF_MEMORY,
            0x0004_0002,
            OutOfMemory,
            "Hash context allocation failed"
        ),
        (
            DRIVER_HASH_INVALID_STATE,
            0x0004_0003,
            BadParameters,
            "Hash context is not in a state allowing this operation"
        ),
        (
            DRIVER_HASH_ALGO_MISMATCH,
            0x0004_0004,
            BadParameters,
            "Hash context was allocated for a different algorithm"
        ),
        (
            DRIVER_HASH_INVALID_DIGEST_LEN,
            0x0004_0005,
            BadParameters,
            "Hash digest buffer is empty"
        ),
        (
            DRIVER_HASH_FOREIGN_CONTEXT,
            0x0004_0006,
            BadParameters,
            "Hash context was allocated by another backend"
        ),
        (
            DRIVER_BLOB_INIT_FAILURE,
            0x0005_0001,
            GenericFailure,
            "Blob manager initialization failed"
        ),
        (
            KAT_HASH_DIGEST_MISMATCH,
            0x0006_0001,
            GenericFailure,
            "Hash known answer test digest mismatch"
        ),
        (
            KAT_HASH_TRUNCATED_MISMATCH,
            0x0006_0002,
            GenericFailure,
            "Hash known answer test truncated digest mismatch"
        ),
    ];
}

impl From<core::num::NonZeroU32> for crate::CaamError {
    fn from(val: core::num::NonZeroU32) -> Self {
        crate::CaamError(val)
    }
}

impl From<CaamError> for core::num::NonZeroU32 {
    fn from(val: CaamError) -> Self {
        val.0
    }
}

impl From<CaamError> for u32 {
    fn from(val: CaamError) -> Self {
        core::num::NonZeroU32::from(val).get()
    }
}

impl TryFrom<u32> for CaamError {
    type Error = TryFromIntError;
    fn try_from(val: u32) -> Result<Self, TryFromIntError> {
        match NonZeroU32::try_from(val) {
            Ok(val) => Ok(CaamError(val)),
            Err(err) => Err(err),
        }
    }
}

impl From<CaamError> for TeeStatus {
    fn from(err: CaamError) -> Self {
        err.status()
    }
}

impl<T> From<CaamResult<T>> for TeeStatus {
    fn from(result: CaamResult<T>) -> Self {
        match result {
            Ok(_) => TeeStatus::Success,
            Err(err) => err.status(),
        }
    }
}

pub type CaamResult<T> = Result<T, CaamError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_try_from() {
        assert!(CaamError::try_from(0).is_err());
        assert_eq!(
            Ok(CaamError::DRIVER_JR_OWNER_LOCKED_MISMATCH),
            CaamError::try_from(0x0002_0003)
        );
    }

    #[test]
    fn test_error_constants_uniqueness() {
        let constants = CaamError::all_constants();
        let mut error_values = HashSet::new();
        let mut duplicates = Vec::new();

        for (name, value) in constants {
            if !error_values.insert(value) {
                duplicates.push((name, value));
            }
        }

        assert!(
            duplicates.is_empty(),
            "Found duplicate error codes: {:?}",
            duplicates
        );
    }

    #[test]
    fn test_status_taxonomy() {
        assert_eq!(
            CaamError::DRIVER_JR_OWNER_LOCKED_MISMATCH.status(),
            TeeStatus::GenericFailure
        );
        assert_eq!(
            CaamError::DRIVER_REGISTRY_ALREADY_REGISTERED.status(),
            TeeStatus::GenericFailure
        );
        assert_eq!(
            CaamError::DRIVER_HASH_NOT_IMPLEMENTED.status(),
            TeeStatus::NotImplemented
        );
        assert_eq!(
            CaamError::DRIVER_HASH_OUT_OF_MEMORY.status(),
            TeeStatus::OutOfMemory
        );
        assert_eq!(
            CaamError::DRIVER_HASH_ALGO_MISMATCH.status(),
            TeeStatus::BadParameters
        );
        assert_eq!(
            CaamError::try_from(0xdead_beef).unwrap().status(),
            TeeStatus::GenericFailure
        );
    }

    #[test]
    fn test_status_from_result() {
        assert_eq!(TeeStatus::from(CaamResult::Ok(())), TeeStatus::Success);
        assert_eq!(
            TeeStatus::from(CaamResult::<()>::Err(
                CaamError::DRIVER_REGISTRY_NOT_FOUND
            )),
            TeeStatus::NotImplemented
        );
    }
}
