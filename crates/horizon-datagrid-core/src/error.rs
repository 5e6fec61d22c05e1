//! Error types for Horizon Datagrid core.

use std::fmt;

use crate::property::PropertyError;

/// The main error type for core operations.
#[derive(Debug)]
pub enum CoreError {
    /// Thread pool error.
    ThreadPool(ThreadPoolError),
    /// UI queue error.
    Queue(QueueError),
    /// Property-related error.
    Property(PropertyError),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ThreadPool(err) => write!(f, "Thread pool error: {err}"),
            Self::Queue(err) => write!(f, "Queue error: {err}"),
            Self::Property(err) => write!(f, "Property error: {err}"),
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ThreadPool(err) => Some(err),
            Self::Queue(err) => Some(err),
            Self::Property(err) => Some(err),
        }
    }
}

impl From<ThreadPoolError> for CoreError {
    fn from(err: ThreadPoolError) -> Self {
        Self::ThreadPool(err)
    }
}

impl From<QueueError> for CoreError {
    fn from(err: QueueError) -> Self {
        Self::Queue(err)
    }
}

impl From<PropertyError> for CoreError {
    fn from(err: PropertyError) -> Self {
        Self::Property(err)
    }
}

/// Thread pool errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadPoolError {
    /// The underlying pool could not be built.
    CreationFailed(String),
}

impl fmt::Display for ThreadPoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreationFailed(msg) => write!(f, "Failed to create thread pool: {msg}"),
        }
    }
}

impl std::error::Error for ThreadPoolError {}

/// UI queue errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// A bounded queue is at capacity.
    Full,
    /// The receiving side is gone.
    Disconnected,
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "UI queue is full"),
            Self::Disconnected => write!(f, "UI queue receiver has been dropped"),
        }
    }
}

impl std::error::Error for QueueError {}

/// A specialized Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
