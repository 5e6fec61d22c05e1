//! UI-thread ownership checks.
//!
//! Layout, binding and presenter mutation all run on one logical UI thread.
//! Objects that must stay there record their creating thread in a
//! [`ThreadAffinity`] and assert it on entry to mutating operations.
//!
//! # Example
//!
//! ```
//! use horizon_datagrid_core::thread_check::ThreadAffinity;
//!
//! struct LayoutState {
//!     affinity: ThreadAffinity,
//!     passes: std::cell::Cell<u32>,
//! }
//!
//! impl LayoutState {
//!     fn run_pass(&self) {
//!         self.affinity.debug_assert_same_thread();
//!         self.passes.set(self.passes.get() + 1);
//!     }
//! }
//!
//! let state = LayoutState { affinity: ThreadAffinity::current(), passes: Default::default() };
//! state.run_pass();
//! ```

use std::thread::ThreadId;

/// The thread a UI-affine object belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadAffinity {
    owner: ThreadId,
}

impl Default for ThreadAffinity {
    fn default() -> Self {
        Self::current()
    }
}

impl ThreadAffinity {
    /// Bind to the calling thread.
    #[inline]
    pub fn current() -> Self {
        Self {
            owner: std::thread::current().id(),
        }
    }

    /// The owning thread.
    #[inline]
    pub fn owner(&self) -> ThreadId {
        self.owner
    }

    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.owner
    }

    /// Panics when called off the owning thread, in every build profile.
    #[inline]
    pub fn assert_same_thread(&self) {
        self.assert_same_thread_with_msg("UI-affine object touched off its thread");
    }

    /// [`assert_same_thread`](Self::assert_same_thread) with `msg` leading
    /// the panic message.
    #[inline]
    pub fn assert_same_thread_with_msg(&self, msg: &str) {
        if !self.is_same_thread() {
            self.wrong_thread(msg);
        }
    }

    /// [`assert_same_thread`](Self::assert_same_thread) in debug builds, a
    /// no-op in release.
    #[inline]
    pub fn debug_assert_same_thread(&self) {
        #[cfg(debug_assertions)]
        self.assert_same_thread();
    }

    /// Debug-only [`assert_same_thread_with_msg`](Self::assert_same_thread_with_msg).
    #[inline]
    pub fn debug_assert_same_thread_with_msg(&self, msg: &str) {
        #[cfg(debug_assertions)]
        self.assert_same_thread_with_msg(msg);
        #[cfg(not(debug_assertions))]
        let _ = msg;
    }

    #[cold]
    #[inline(never)]
    fn wrong_thread(&self, msg: &str) -> ! {
        let current = std::thread::current();
        panic!(
            "{msg}: owned by thread {:?}, touched from \"{}\" ({:?}); \
             deliver background results through a UiQueue instead",
            self.owner,
            current.name().unwrap_or("<unnamed>"),
            current.id(),
        )
    }
}
