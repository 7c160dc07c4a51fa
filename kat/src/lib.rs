/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the CAAM Known Answer Tests.

--*/

#![no_std]

mod hash_kat;

pub use caam_error::{CaamError, CaamResult};
pub use hash_kat::HashKat;
