/*++

Licensed under the Apache-2.0 license.

File Name:

    jr_regs.rs

Abstract:

    File contains the job ring ownership (DID) register definitions of the
    CAAM controller register block

--*/

use tock_registers::register_bitfields;

/// Offset of the job ring 0 DID most-significant register
pub(crate) const JR0DID_MS: usize = 0x0010;

/// Offset of the job ring 0 DID least-significant register
pub(crate) const JR0DID_LS: usize = 0x0014;

/// Distance between two job rings' DID register pairs
pub(crate) const JRXDID_SIZE: usize = 0x8;

/// Offset of the first job ring register block from the controller base
pub(crate) const JR0_OFFSET: usize = 0x1000;

/// Size of a job ring register block
pub(crate) const JR_BLOCK_SIZE: usize = 0x1000;

/// Number of job rings of the controller
pub(crate) const JR_COUNT: usize = 4;

/// Offset of the DID_MS register of job ring `idx`
pub(crate) const fn jrx_did_ms(idx: usize) -> usize {
    JR0DID_MS + idx * JRXDID_SIZE
}

/// Offset of the DID_LS register of job ring `idx`
pub(crate) const fn jrx_did_ls(idx: usize) -> usize {
    JR0DID_LS + idx * JRXDID_SIZE
}

register_bitfields! [
    u32,

    /// Job Ring DID Most-Significant Register Fields
    pub(crate) JRDID_MS [
        PRIM_DID OFFSET(0) NUMBITS(4) [],
        PRIM_TZ OFFSET(4) NUMBITS(1) [],
        TZ_OWN OFFSET(15) NUMBITS(1) [],
        AMTD OFFSET(16) NUMBITS(1) [],
        LAMTD OFFSET(17) NUMBITS(1) [],
        PRIM_ICID OFFSET(19) NUMBITS(10) [],
        LDID OFFSET(31) NUMBITS(1) [],
    ],
];
