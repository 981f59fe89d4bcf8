//! Sandbox adapters that touch the filesystem and DNS.
//!
//! The policies themselves (deny-lists, blocked address ranges) live in
//! the domain crate; this module applies them to real paths and hosts.

pub mod path_sandbox;

#[cfg(feature = "web-tools")]
pub mod network_guard;

pub use path_sandbox::PathSandbox;

#[cfg(feature = "web-tools")]
pub use network_guard::{HostResolver, NetworkGuard, SystemResolver};
