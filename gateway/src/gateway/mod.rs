//! Dispatch core.
//!
//! This module provides:
//! - A process-wide concurrency limiter for hosting-service calls
//! - Single-item and whole-batch dispatchers
//! - Per-item fallback when the batch call fails
//! - Aggregation of per-item outcomes into the batch response

pub mod aggregator;
mod batch_dispatcher;
mod dispatcher;
mod fallback;
mod limiter;
mod service;

pub use aggregator::{BatchResult, QueryOutcome};
pub use batch_dispatcher::BatchDispatcher;
pub use dispatcher::SingleDispatcher;
pub use fallback::FallbackOrchestrator;
pub use limiter::{ConcurrencyLimiter, LimiterPermit};
pub use service::ChatService;
