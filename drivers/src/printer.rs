/*++

Licensed under the Apache-2.0 license.

File Name:

    printer.rs

Abstract:

    File contains support routines and macros for driver diagnostics

--*/
use core::convert::Infallible;
use ufmt::{uDisplay, uWrite};

#[derive(Default)]
pub struct Printer;

cfg_if::cfg_if! {
    if #[cfg(any(feature = "std", test))] {
        fn emit(str: &str) {
            print!("{str}");
        }
    } else {
        #[inline(never)]
        fn emit(_str: &str) {}
    }
}

impl uWrite for Printer {
    type Error = Infallible;

    /// Writes a string slice into this writer, returning whether the write succeeded.
    fn write_str(&mut self, str: &str) -> Result<(), Self::Error> {
        emit(str);
        Ok(())
    }
}

#[macro_export]
macro_rules! cprintln {
    ($($tt:tt)*) => {{
        let _ = ufmt::uwriteln!(&mut $crate::printer::Printer::default(), $($tt)*);
    }}
}

/// Register-level tracing, compiled in with the `trace` feature.
#[cfg(feature = "trace")]
#[macro_export]
macro_rules! caam_trace {
    ($($tt:tt)*) => {
        $crate::cprintln!($($tt)*)
    };
}

#[cfg(not(feature = "trace"))]
#[macro_export]
macro_rules! caam_trace {
    ($($tt:tt)*) => {{}};
}

/// Formats a byte slice as upper-case hex.
pub struct HexBytes<'a>(pub &'a [u8]);
impl uDisplay for HexBytes<'_> {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        for &x in self.0.iter() {
            for c in [x >> 4, x & 0xf] {
                if c < 10 {
                    f.write_char((c + b'0') as char)?;
                } else {
                    f.write_char((c - 10 + b'A') as char)?;
                }
            }
        }
        Ok(())
    }
}
