//! Status pool error types.

use std::fmt;

/// Errors returned by [`StatusPool::submit`](super::StatusPool::submit).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The request queue is full.
    QueueFull {
        /// Maximum queue capacity.
        capacity: usize,
        /// Current number of pending requests.
        pending: usize,
    },

    /// The pool has been shut down.
    Shutdown,
}

impl PoolError {
    /// Check if this is a queue full error.
    pub fn is_queue_full(&self) -> bool {
        matches!(self, PoolError::QueueFull { .. })
    }

    /// Check if this is a shutdown error.
    pub fn is_shutdown(&self) -> bool {
        matches!(self, PoolError::Shutdown)
    }

    /// Get the error message for logging.
    pub fn message(&self) -> &str {
        match self {
            PoolError::QueueFull { .. } => "Queue full",
            PoolError::Shutdown => "Pool shutdown",
        }
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::QueueFull { capacity, pending } => {
                write!(
                    f,
                    "queue full: {}/{} pending requests",
                    pending, capacity
                )
            }
            PoolError::Shutdown => {
                write!(f, "pool has been shut down")
            }
        }
    }
}

impl std::error::Error for PoolError {}

/// Result type alias for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_full() {
        let err = PoolError::QueueFull {
            capacity: 32,
            pending: 32,
        };
        assert!(err.is_queue_full());
        assert!(!err.is_shutdown());
        assert_eq!(err.message(), "Queue full");
        assert_eq!(err.to_string(), "queue full: 32/32 pending requests");
    }

    #[test]
    fn test_shutdown() {
        let err = PoolError::Shutdown;
        assert!(err.is_shutdown());
        assert_eq!(err.message(), "Pool shutdown");
    }
}
