//! Host shell: owns the active module session and applies transitions.
//!
//! The shell is a plain `&mut self` state machine. [`crate::host::Host`]
//! runs it inside a worker task so many callers can share one shell.

mod error;
mod host_shell;
mod session;

pub use error::ShellError;
pub use host_shell::HostShell;
pub use session::{DispatchOutcome, SessionSnapshot, Transition};
