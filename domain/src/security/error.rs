//! Rejection reasons raised by the sandbox policies.

use crate::tool::value_objects::ToolError;
use std::net::IpAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Path confinement failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SandboxError {
    #[error("path {path} is outside the sandbox")]
    OutsideSandbox { path: PathBuf },

    #[error("path {path} must be absolute")]
    NotAbsolute { path: PathBuf },

    #[error("cannot expand '~': home directory is unknown")]
    NoHomeDirectory,
}

impl From<SandboxError> for ToolError {
    fn from(e: SandboxError) -> Self {
        match e {
            SandboxError::OutsideSandbox { .. } => ToolError::outside_sandbox(e.to_string()),
            SandboxError::NotAbsolute { .. } | SandboxError::NoHomeDirectory => {
                ToolError::validation_failed(e.to_string())
            }
        }
    }
}

/// Fetch target failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FetchTargetError {
    #[error("only http and https URLs are allowed: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("URL has no host: {0}")]
    MissingHost(String),

    #[error("cannot resolve host {host}: {reason}")]
    UnresolvableHost { host: String, reason: String },

    #[error("access to private address {addr} (host {host}) is blocked")]
    PrivateAddressBlocked { host: String, addr: IpAddr },
}

impl From<FetchTargetError> for ToolError {
    fn from(e: FetchTargetError) -> Self {
        match e {
            FetchTargetError::PrivateAddressBlocked { .. } => {
                ToolError::private_address_blocked(e.to_string())
            }
            _ => ToolError::validation_failed(e.to_string()),
        }
    }
}
