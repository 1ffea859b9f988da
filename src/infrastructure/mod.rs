//! Infrastructure layer: cache, upstream HTTP plumbing, and provider clients.

pub mod cache;
pub mod http;
pub mod sources;
