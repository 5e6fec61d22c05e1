//! Background workers with cooperative cancellation.
//!
//! Async validators run here, off the UI thread. A task never hands its
//! result back directly: it is sent through a [`UiSender`] and the UI
//! thread merges it when it drains the matching
//! [`UiQueue`](crate::queue::UiQueue).
//!
//! # Example
//!
//! ```
//! use horizon_datagrid_core::{CancellationToken, ThreadPool, ThreadPoolConfig, UiQueue};
//! use std::time::Duration;
//!
//! let pool = ThreadPool::new(ThreadPoolConfig::with_threads(1)).unwrap();
//! let results = UiQueue::unbounded();
//! let token = CancellationToken::new();
//!
//! let cancel = token.clone();
//! pool.spawn_to(results.sender(), move || if cancel.is_cancelled() { None } else { Some(42) });
//!
//! let delivered = results.drain_timeout(Duration::from_secs(5));
//! assert_eq!(delivered.len(), 1);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rayon::{ThreadPool as RayonThreadPool, ThreadPoolBuilder};

use crate::error::ThreadPoolError;
use crate::queue::UiSender;

/// A shared flag a running task polls to learn it has been superseded.
///
/// Clones share the flag. Cancelling is advisory: the task decides when
/// to look.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Raise the flag. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether two tokens share the same flag.
    pub fn same_as(&self, other: &CancellationToken) -> bool {
        Arc::ptr_eq(&self.cancelled, &other.cancelled)
    }
}

/// Configuration for creating a thread pool.
#[derive(Debug, Clone)]
pub struct ThreadPoolConfig {
    /// Number of worker threads. `None` means one per CPU core.
    pub num_threads: Option<usize>,
    /// Name prefix for worker threads.
    pub thread_name: String,
    /// Stack size for worker threads in bytes.
    pub stack_size: Option<usize>,
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            thread_name: "datagrid-worker".to_string(),
            stack_size: None,
        }
    }
}

impl ThreadPoolConfig {
    pub fn with_threads(num_threads: usize) -> Self {
        Self {
            num_threads: Some(num_threads),
            ..Default::default()
        }
    }

    /// Set the worker thread name prefix.
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}

/// A rayon-backed pool for validator runs.
///
/// Cloning is cheap and shares the underlying pool.
#[derive(Clone)]
pub struct ThreadPool {
    pool: Arc<RayonThreadPool>,
    in_flight: Arc<AtomicUsize>,
}

impl ThreadPool {
    pub fn new(config: ThreadPoolConfig) -> Result<Self, ThreadPoolError> {
        let name = config.thread_name.clone();
        let mut builder = ThreadPoolBuilder::new()
            .thread_name(move |index| format!("{name}-{index}"))
            .panic_handler(|payload| {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_default();
                tracing::error!(
                    target: "horizon_datagrid_core::threadpool",
                    %reason,
                    "task panicked"
                );
            });
        if let Some(num_threads) = config.num_threads {
            builder = builder.num_threads(num_threads);
        }
        if let Some(stack_size) = config.stack_size {
            builder = builder.stack_size(stack_size);
        }
        let pool = builder
            .build()
            .map_err(|e| ThreadPoolError::CreationFailed(e.to_string()))?;

        tracing::debug!(
            target: "horizon_datagrid_core::threadpool",
            threads = pool.current_num_threads(),
            "thread pool created"
        );

        Ok(Self {
            pool: Arc::new(pool),
            in_flight: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Tasks queued or running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run `task` on a worker and deliver its result through `sender`.
    ///
    /// A send failure (queue dropped or full) is logged and the result
    /// discarded. A task that panics delivers nothing; the panic is logged
    /// and the worker carries on.
    pub fn spawn_to<F, T>(&self, sender: UiSender<T>, task: F)
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        let in_flight = InFlight(self.in_flight.clone());
        self.pool.spawn(move || {
            let _in_flight = in_flight;
            let result = task();
            if let Err(err) = sender.send(result) {
                tracing::warn!(
                    target: "horizon_datagrid_core::threadpool",
                    %err,
                    "dropping task result"
                );
            }
        });
    }
}

/// Decrements the in-flight count when the task ends, unwinding included.
struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl std::fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPool")
            .field("num_threads", &self.num_threads())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::UiQueue;
    use std::time::Duration;

    #[test]
    fn test_token_clones_share_flag() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(token.same_as(&clone));
        assert!(!token.same_as(&CancellationToken::new()));
        clone.cancel();
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_results_arrive_through_queue() {
        let config = ThreadPoolConfig::with_threads(2).with_thread_name("test");
        let pool = ThreadPool::new(config).unwrap();
        assert_eq!(pool.num_threads(), 2);
        let queue = UiQueue::unbounded();
        for n in 0..10 {
            pool.spawn_to(queue.sender(), move || n * 2);
        }

        let mut seen = Vec::new();
        while seen.len() < 10 {
            let batch = queue.drain_timeout(Duration::from_secs(5));
            assert!(!batch.is_empty(), "timed out waiting for results");
            seen.extend(batch);
        }
        seen.sort();
        assert_eq!(seen, (0..10).map(|n| n * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_panicking_task_does_not_take_the_pool_down() {
        let pool = ThreadPool::new(ThreadPoolConfig::with_threads(1)).unwrap();
        let queue = UiQueue::unbounded();
        pool.spawn_to(queue.sender(), || -> u8 { panic!("task bug") });
        pool.spawn_to(queue.sender(), || 7u8);
        assert_eq!(queue.drain_timeout(Duration::from_secs(5)), vec![7]);

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while pool.in_flight() > 0 && std::time::Instant::now() < deadline {
            std::thread::yield_now();
        }
        assert_eq!(pool.in_flight(), 0);
    }

    #[test]
    fn test_cancelled_task_sees_flag() {
        let pool = ThreadPool::new(ThreadPoolConfig::with_threads(1)).unwrap();
        let queue = UiQueue::unbounded();
        let token = CancellationToken::new();
        token.cancel();
        let cancel = token.clone();
        pool.spawn_to(queue.sender(), move || cancel.is_cancelled());
        assert_eq!(queue.drain_timeout(Duration::from_secs(5)), vec![true]);
    }
}
