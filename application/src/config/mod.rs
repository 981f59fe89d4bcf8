//! Application-level configuration.
//!
//! - [`InterceptorConfig`]: periodic instruction re-injection around dispatch output

pub mod interceptor_config;

pub use interceptor_config::InterceptorConfig;
