//! HTTP middleware: rate limiting, tracing, security headers, access log.

pub mod access_log;
pub mod rate_limit;
pub mod security_headers;
pub mod tracing;
