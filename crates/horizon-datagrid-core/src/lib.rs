//! Core plumbing for Horizon Datagrid.
//!
//! This crate provides the UI-thread foundations the presenter engine is
//! built on:
//!
//! - **Signal/Slot System**: change-notification callback lists
//! - **Property System**: observable fields with declaration-time metadata
//! - **Thread Affinity**: checks that UI-affine objects stay on their thread
//! - **UI Queue**: delivery of background results back to the UI thread
//! - **Thread Pool**: background work with cooperative cancellation
//!
//! # Example
//!
//! ```
//! use horizon_datagrid_core::{Signal, Property};
//!
//! struct Counter {
//!     value: Property<i32>,
//!     value_changed: Signal<i32>,
//! }
//!
//! impl Counter {
//!     fn increment(&self) {
//!         let new_value = self.value.get() + 1;
//!         if self.value.set(new_value) {
//!             self.value_changed.emit(new_value);
//!         }
//!     }
//! }
//!
//! let counter = Counter { value: Property::new(0), value_changed: Signal::new() };
//! counter.increment();
//! assert_eq!(counter.value.get(), 1);
//! ```

mod error;
pub mod logging;
pub mod property;
pub mod queue;
pub mod signal;
pub mod thread_check;
pub mod threadpool;

pub use error::{CoreError, QueueError, Result, ThreadPoolError};
pub use logging::PerfSpan;
pub use property::{ObservableProperty, Property, PropertyError, PropertyMeta};
pub use queue::{UiQueue, UiSender};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use thread_check::ThreadAffinity;
pub use threadpool::{CancellationToken, ThreadPool, ThreadPoolConfig};
