//! The recycling pool of view elements.

mod manager;

pub use manager::{ElementId, ElementsManager, PoolStats};
