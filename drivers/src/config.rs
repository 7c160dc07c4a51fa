/*++

Licensed under the Apache-2.0 license.

File Name:

    config.rs

Abstract:

    File contains the driver configuration derived from build features.

--*/

/// Driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaamConfig {
    /// Secure job-ring owners also set the local DID and AMTD lock bits,
    /// granting the software crypto library a path through the same ring.
    pub sw_crypto_grant: bool,
}

impl CaamConfig {
    /// Configuration selected by the `sw-crypto` build feature
    pub const DEFAULT: Self = Self {
        sw_crypto_grant: cfg!(feature = "sw-crypto"),
    };
}

impl Default for CaamConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
