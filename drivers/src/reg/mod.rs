/*++

Licensed under the Apache-2.0 license.

File Name:

    mod.rs

Abstract:

    File contains register definitions for the CAAM controller

--*/

pub(crate) mod jr_regs;
