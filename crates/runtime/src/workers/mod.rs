//! Worker tasks that back the host orchestration.
//!
//! The shell worker owns the [`crate::shell::HostShell`] and processes
//! commands one at a time.

mod shell;

pub use shell::{Command, ShellWorker};
