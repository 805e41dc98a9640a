//! Per-client admission control for the create endpoint.
//!
//! Each client identity owns a [`TokenBucket`]; the [`RateLimiterRegistry`]
//! creates buckets on first sight and hands out non-blocking yes/no answers.

mod registry;
mod token_bucket;

pub use registry::RateLimiterRegistry;
pub use token_bucket::TokenBucket;
