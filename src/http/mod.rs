//! HTTP client module
//!
//! Thin reqwest wrapper used by the page fetcher.
//!
//! # Features
//!
//! - **Error Classification**: Failures map to transient or fatal fetch errors
//! - **Rate Limiting**: Optional token bucket rate limiter using governor

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
