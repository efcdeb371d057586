//! `RateLimitStore` adapters.

pub mod distributed;
pub mod memory;
