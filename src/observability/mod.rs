//! Observability module: Prometheus metrics.
//!
//! Logging setup lives in [`crate::logging`]; this module only owns the
//! metric registry exported at `GET /metrics`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use heroku_watch::observability::Metrics;
//!
//! let metrics = Metrics::new()?;
//! metrics.record_check(false, 0.8);
//! println!("{}", metrics.export());
//! ```

pub mod metrics;

// Re-exports
pub use metrics::Metrics;
