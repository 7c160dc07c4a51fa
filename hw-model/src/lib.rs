// Licensed under the Apache-2.0 license

//! Host-side model of the CAAM register space, used by tests to stand in
//! for the controller behind the MMIO shim.

mod log;
mod model_mmio;

pub use log::Log;
pub use model_mmio::{ModelMmio, WriteLock};
