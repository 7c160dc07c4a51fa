/*++

Licensed under the Apache-2.0 license.

File Name:

    log.rs

Abstract:

    File contains the text log of register accesses made against the model.

--*/
use std::{
    cell::{Ref, RefCell},
    fmt::{self, Write},
};

/// Register access log, one line per access.
///
/// Lines are recorded through a shared reference so the model can log from
/// its `&self` MMIO methods.
#[derive(Default)]
pub struct Log {
    lines: RefCell<String>,
}

impl Log {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one access line.
    pub(crate) fn record(&self, args: fmt::Arguments<'_>) {
        let mut lines = self.lines.borrow_mut();
        // Writing into a String cannot fail.
        let _ = lines.write_fmt(args);
        lines.push('\n');
    }

    /// Contents of the log.
    pub fn as_str(&self) -> Ref<'_, str> {
        Ref::map(self.lines.borrow(), String::as_str)
    }

    /// Empty the log, returning what it held.
    pub fn take(&self) -> String {
        self.lines.take()
    }

    /// Lines recording applied writes, in order.
    pub fn writes(&self) -> Vec<String> {
        self.as_str()
            .lines()
            .filter(|line| line.starts_with("write"))
            .map(String::from)
            .collect()
    }
}
