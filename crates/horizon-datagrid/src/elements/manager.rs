use std::collections::{HashMap, VecDeque};

use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;
use crate::view::{Element, ElementKind, ElementSpec};

new_key_type! {
    /// Identifies an element owned by an [`ElementsManager`].
    ///
    /// Ids are never reused, so comparing ids across layout passes tells
    /// whether the same element instance was recycled.
    pub struct ElementId;
}

/// Counters describing pool activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Elements created by factories.
    pub created: usize,
    /// Checkouts served from a pool.
    pub reused: usize,
    /// Elements dropped because their pool was full.
    pub evicted: usize,
}

/// Owns every view element and recycles them per [`ElementKind`].
///
/// Checkout prefers the most recently returned element of the requested
/// kind, so an element returned for a unit and immediately requested again
/// for the same kind comes back unchanged. When a pool grows past its
/// capacity the element idle the longest is dropped.
#[derive(Debug)]
pub struct ElementsManager {
    elements: SlotMap<ElementId, Element>,
    pools: HashMap<ElementKind, VecDeque<ElementId>>,
    capacity: usize,
    stats: PoolStats,
}

impl ElementsManager {
    /// Create a manager whose per-kind pools hold at most `capacity` idle
    /// elements.
    pub fn new(capacity: usize) -> Self {
        Self {
            elements: SlotMap::with_key(),
            pools: HashMap::new(),
            capacity,
            stats: PoolStats::default(),
        }
    }

    /// Maximum idle elements per kind.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the pool capacity, evicting surplus idle elements.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        let kinds: Vec<ElementKind> = self.pools.keys().copied().collect();
        for kind in kinds {
            self.trim(kind);
        }
    }

    /// Get an element of `spec`'s kind, reusing a pooled one if possible.
    ///
    /// The returned element is detached; the caller attaches it.
    pub fn checkout(&mut self, spec: &ElementSpec) -> ElementId {
        let kind = spec.kind();
        if let Some(id) = self.pools.get_mut(&kind).and_then(VecDeque::pop_back) {
            self.stats.reused += 1;
            tracing::trace!(target: targets::ELEMENTS, %kind, ?id, "reused element");
            return id;
        }
        let id = self.elements.insert(spec.create());
        self.stats.created += 1;
        tracing::trace!(target: targets::ELEMENTS, %kind, ?id, "created element");
        id
    }

    /// Put an element back in its pool.
    ///
    /// # Panics
    ///
    /// Panics if the element is still attached, or if `id` is not live.
    pub fn release(&mut self, id: ElementId) {
        let Some(element) = self.elements.get(id) else {
            panic!("release of unknown element {id:?}");
        };
        assert!(
            !element.is_attached(),
            "release of {} element {id:?} still attached to {:?}",
            element.kind(),
            element.owner()
        );
        let kind = element.kind();
        tracing::trace!(target: targets::ELEMENTS, %kind, ?id, "returned element");
        self.pools.entry(kind).or_default().push_back(id);
        self.trim(kind);
    }

    fn trim(&mut self, kind: ElementKind) {
        let Some(pool) = self.pools.get_mut(&kind) else {
            return;
        };
        while pool.len() > self.capacity {
            if let Some(evicted) = pool.pop_front() {
                self.elements.remove(evicted);
                self.stats.evicted += 1;
                tracing::warn!(
                    target: targets::ELEMENTS,
                    %kind,
                    capacity = self.capacity,
                    "pool over capacity, evicted idle element"
                );
            }
        }
    }

    /// Borrow an element.
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Mutably borrow an element.
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    /// Whether `id` refers to a live element.
    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(id)
    }

    /// Idle elements of `kind`.
    pub fn pooled(&self, kind: ElementKind) -> usize {
        self.pools.get(&kind).map_or(0, VecDeque::len)
    }

    /// Live elements, pooled or in use.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether no elements exist.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements currently checked out.
    pub fn in_use(&self) -> usize {
        self.elements.len() - self.pools.values().map(VecDeque::len).sum::<usize>()
    }

    /// Pool activity counters.
    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Iterate over every live element.
    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.elements.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Owner;

    fn spec(kind: &'static str) -> ElementSpec {
        ElementSpec::simple(ElementKind(kind), "value")
    }

    #[test]
    fn test_release_then_checkout_reuses() {
        let mut m = ElementsManager::new(4);
        let s = spec("text");
        let a = m.checkout(&s);
        let b = m.checkout(&s);
        m.release(a);
        m.release(b);
        assert_eq!(m.checkout(&s), b);
        assert_eq!(m.checkout(&s), a);
        assert_eq!(m.stats().created, 2);
        assert_eq!(m.stats().reused, 2);
    }

    #[test]
    fn test_pools_are_per_kind() {
        let mut m = ElementsManager::new(4);
        let a = m.checkout(&spec("text"));
        m.release(a);
        let b = m.checkout(&spec("check"));
        assert_ne!(a, b);
        assert_eq!(m.pooled(ElementKind("text")), 1);
        assert_eq!(m.in_use(), 1);
    }

    #[test]
    fn test_eviction_drops_least_recently_returned() {
        let mut m = ElementsManager::new(1);
        let s = spec("text");
        let a = m.checkout(&s);
        let b = m.checkout(&s);
        m.release(a);
        m.release(b);
        assert!(!m.contains(a));
        assert!(m.contains(b));
        assert_eq!(m.stats().evicted, 1);
        assert_eq!(m.len(), 1);
    }

    #[test]
    #[should_panic(expected = "still attached")]
    fn test_release_attached_panics() {
        let mut m = ElementsManager::new(1);
        let a = m.checkout(&spec("text"));
        m.get_mut(a).unwrap().attach(Owner::Block(0));
        m.release(a);
    }

    #[test]
    fn test_set_capacity_trims() {
        let mut m = ElementsManager::new(3);
        let s = spec("text");
        let ids: Vec<_> = (0..3).map(|_| m.checkout(&s)).collect();
        for id in &ids {
            m.release(*id);
        }
        m.set_capacity(1);
        assert_eq!(m.pooled(ElementKind("text")), 1);
        assert!(m.contains(ids[2]));
    }
}
