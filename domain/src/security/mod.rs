//! Sandbox policies
//!
//! Pure policy decisions used by the tools' validators and executors:
//!
//! - [`CommandGuard`]: deny-list classification of shell commands
//! - [`address_policy`]: which resolved IP addresses a fetch may target
//! - [`SandboxError`] / [`FetchTargetError`]: rejection reasons, shared with
//!   the infrastructure adapters that touch the filesystem and DNS
//!
//! These checks are best-effort containment, not a general sandbox: there
//! is no syscall filtering or container isolation behind them.

pub mod address_policy;
pub mod command_guard;
mod error;

pub use command_guard::{CommandGuard, DangerousCommand};
pub use error::{FetchTargetError, SandboxError};
