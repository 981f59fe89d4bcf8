//! **Web Tools**: `web_fetch`
//!
//! Gated behind the `web-tools` Cargo feature flag:
//!
//! ```toml
//! # infrastructure/Cargo.toml
//! [features]
//! web-tools = ["dep:reqwest", "dep:scraper"]
//!
//! # cli/Cargo.toml (enabled by default for end users)
//! [features]
//! default = ["web-tools"]
//! web-tools = ["openlink-infrastructure/web-tools"]
//! ```
//!
//! Every fetch target passes [`NetworkGuard`](crate::security::NetworkGuard)
//! during validation, before any connection is opened.

mod fetch;

pub use fetch::{WEB_FETCH, WebFetchTool, html_to_text, web_fetch_definition};
