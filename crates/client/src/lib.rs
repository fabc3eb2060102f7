//! Line-oriented terminal front-end for the League of Fun host.
//!
//! ```text
//! stdin ──▶ ReplCommand::parse ──▶ HostHandle ──▶ HostShell (worker)
//!                                                   │
//! stdout ◀── event printer (bus subscriber) ◀──────┘
//! ```

pub mod command;
pub mod logging;
mod repl;

pub use command::{ParseError, ReplCommand};
pub use repl::Repl;
