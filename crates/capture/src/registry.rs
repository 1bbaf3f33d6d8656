//! Registry of live modes and of actions waiting for a mode to appear.
//!
//! Every operation takes one lock, so a command racing a "remove all"
//! notification sees either the mode or nothing, never a half-removed entry.
//! Actions are handed back to the caller instead of being run under the lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// What the registry needs to know about a stored mode.
pub trait RegisteredMode {
    fn mode_id(&self) -> i64;

    fn parent_id(&self) -> Option<i64>;
}

/// How a caller addresses a mode that may not exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeTarget {
    Id(i64),
    Parent(i64),
}

struct Inner<M, A> {
    modes: HashMap<i64, Arc<M>>,
    /// Registration order; the last entry is the topmost mode.
    order: Vec<i64>,
    pending_by_id: HashMap<i64, Vec<A>>,
    pending_by_parent: HashMap<i64, Vec<A>>,
}

impl<M, A> Inner<M, A> {
    fn lookup(&self, target: ModeTarget) -> Option<Arc<M>>
    where
        M: RegisteredMode,
    {
        match target {
            ModeTarget::Id(id) => self.modes.get(&id).cloned(),
            ModeTarget::Parent(parent) => self
                .order
                .iter()
                .filter_map(|id| self.modes.get(id))
                .find(|mode| mode.parent_id() == Some(parent))
                .cloned(),
        }
    }

    fn queue(&mut self, target: ModeTarget) -> &mut Vec<A> {
        match target {
            ModeTarget::Id(id) => self.pending_by_id.entry(id).or_default(),
            ModeTarget::Parent(parent) => self.pending_by_parent.entry(parent).or_default(),
        }
    }
}

pub struct ModeRegistry<M, A> {
    inner: Mutex<Inner<M, A>>,
}

impl<M, A> Default for ModeRegistry<M, A> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner {
                modes: HashMap::new(),
                order: Vec::new(),
                pending_by_id: HashMap::new(),
                pending_by_parent: HashMap::new(),
            }),
        }
    }
}

impl<M: RegisteredMode, A> ModeRegistry<M, A> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner<M, A>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a mode, returning the one it replaced under the same id.
    pub fn add(&self, mode: Arc<M>) -> Option<Arc<M>> {
        let id = mode.mode_id();
        let mut inner = self.lock();
        inner.order.retain(|existing| *existing != id);
        inner.order.push(id);
        inner.modes.insert(id, mode)
    }

    /// Store a mode and take every action deferred for its id, then for its
    /// parent, in arrival order.
    pub fn register(&self, mode: Arc<M>) -> (Option<Arc<M>>, Vec<A>) {
        let id = mode.mode_id();
        let parent = mode.parent_id();
        let mut inner = self.lock();

        inner.order.retain(|existing| *existing != id);
        inner.order.push(id);
        let replaced = inner.modes.insert(id, mode);

        let mut actions = inner.pending_by_id.remove(&id).unwrap_or_default();
        if let Some(parent) = parent {
            actions.extend(inner.pending_by_parent.remove(&parent).unwrap_or_default());
        }
        (replaced, actions)
    }

    pub fn remove(&self, mode_id: i64) -> Option<Arc<M>> {
        let mut inner = self.lock();
        inner.order.retain(|existing| *existing != mode_id);
        inner.modes.remove(&mode_id)
    }

    pub fn get(&self, mode_id: i64) -> Option<Arc<M>> {
        self.lock().lookup(ModeTarget::Id(mode_id))
    }

    /// First registered mode grouped under `parent_id`.
    pub fn get_by_parent(&self, parent_id: i64) -> Option<Arc<M>> {
        self.lock().lookup(ModeTarget::Parent(parent_id))
    }

    pub fn find(&self, target: ModeTarget) -> Option<Arc<M>> {
        self.lock().lookup(target)
    }

    /// All modes in registration order.
    pub fn get_all(&self) -> Vec<Arc<M>> {
        let inner = self.lock();
        inner
            .order
            .iter()
            .filter_map(|id| inner.modes.get(id).cloned())
            .collect()
    }

    /// Most recently registered mode still alive.
    pub fn topmost(&self) -> Option<Arc<M>> {
        let inner = self.lock();
        inner
            .order
            .last()
            .and_then(|id| inner.modes.get(id).cloned())
    }

    /// Remove every mode, returning them in registration order.
    pub fn remove_all(&self) -> Vec<Arc<M>> {
        let mut inner = self.lock();
        let order = std::mem::take(&mut inner.order);
        let mut modes = std::mem::take(&mut inner.modes);
        order.iter().filter_map(|id| modes.remove(id)).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().modes.is_empty()
    }

    pub fn defer_until_created(&self, mode_id: i64, action: A) {
        self.lock().queue(ModeTarget::Id(mode_id)).push(action);
    }

    pub fn defer_until_created_by_parent(&self, parent_id: i64, action: A) {
        self.lock().queue(ModeTarget::Parent(parent_id)).push(action);
    }

    /// Return the mode for `target`, or queue the action `defer` builds.
    ///
    /// Lookup and enqueue happen under one lock, so a registration running
    /// concurrently either is seen here or drains the new action.
    pub fn resolve_or_defer(&self, target: ModeTarget, defer: impl FnOnce() -> A) -> Option<Arc<M>> {
        let mut inner = self.lock();
        if let Some(mode) = inner.lookup(target) {
            return Some(mode);
        }
        inner.queue(target).push(defer());
        None
    }

    pub fn drain_actions_for(&self, mode_id: i64) -> Vec<A> {
        self.lock()
            .pending_by_id
            .remove(&mode_id)
            .unwrap_or_default()
    }

    pub fn drain_actions_for_parent(&self, parent_id: i64) -> Vec<A> {
        self.lock()
            .pending_by_parent
            .remove(&parent_id)
            .unwrap_or_default()
    }

    /// Drop pending actions of one mode id, or of everything with `None`.
    pub fn clear_pending_actions(&self, mode_id: Option<i64>) {
        let mut inner = self.lock();
        match mode_id {
            Some(id) => {
                inner.pending_by_id.remove(&id);
            }
            None => {
                inner.pending_by_id.clear();
                inner.pending_by_parent.clear();
            }
        }
    }

    pub fn pending_actions(&self, target: ModeTarget) -> usize {
        let inner = self.lock();
        let queue = match target {
            ModeTarget::Id(id) => inner.pending_by_id.get(&id),
            ModeTarget::Parent(parent) => inner.pending_by_parent.get(&parent),
        };
        queue.map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Mode {
        id: i64,
        parent: Option<i64>,
    }

    impl RegisteredMode for Mode {
        fn mode_id(&self) -> i64 {
            self.id
        }

        fn parent_id(&self) -> Option<i64> {
            self.parent
        }
    }

    fn mode(id: i64, parent: Option<i64>) -> Arc<Mode> {
        Arc::new(Mode { id, parent })
    }

    type Registry = ModeRegistry<Mode, &'static str>;

    #[test]
    fn test_unknown_ids_are_empty_not_errors() {
        let registry = Registry::new();
        assert!(registry.get(1).is_none());
        assert!(registry.get_by_parent(1).is_none());
        assert!(registry.remove(1).is_none());
        assert!(registry.topmost().is_none());
        assert!(registry.drain_actions_for(1).is_empty());
    }

    #[test]
    fn test_add_get_remove() {
        let registry = Registry::new();
        registry.add(mode(1, Some(10)));
        registry.add(mode(2, None));

        assert_eq!(registry.get(1).unwrap().id, 1);
        assert_eq!(registry.get_by_parent(10).unwrap().id, 1);
        assert_eq!(registry.len(), 2);

        assert_eq!(registry.remove(1).unwrap().id, 1);
        assert!(registry.get(1).is_none());
        assert!(registry.get_by_parent(10).is_none());
    }

    #[test]
    fn test_topmost_follows_registration_order() {
        let registry = Registry::new();
        registry.add(mode(1, None));
        registry.add(mode(2, None));
        assert_eq!(registry.topmost().unwrap().id, 2);

        registry.remove(2);
        assert_eq!(registry.topmost().unwrap().id, 1);

        let ids: Vec<_> = registry.get_all().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_register_drains_in_fifo_order() {
        let registry = Registry::new();
        registry.defer_until_created(5, "first");
        registry.defer_until_created_by_parent(3, "by-parent");
        registry.defer_until_created(5, "second");
        registry.defer_until_created(6, "other");

        let (replaced, actions) = registry.register(mode(5, Some(3)));

        assert!(replaced.is_none());
        assert_eq!(actions, vec!["first", "second", "by-parent"]);
        assert_eq!(registry.pending_actions(ModeTarget::Id(5)), 0);
        assert_eq!(registry.pending_actions(ModeTarget::Parent(3)), 0);
        assert_eq!(registry.pending_actions(ModeTarget::Id(6)), 1);

        // Drained actions never come back.
        let (_, again) = registry.register(mode(5, Some(3)));
        assert!(again.is_empty());
    }

    #[test]
    fn test_resolve_or_defer() {
        let registry = Registry::new();

        assert!(registry
            .resolve_or_defer(ModeTarget::Parent(3), || "attach")
            .is_none());
        assert_eq!(registry.pending_actions(ModeTarget::Parent(3)), 1);

        let (_, actions) = registry.register(mode(1, Some(3)));
        assert_eq!(actions, vec!["attach"]);

        let found = registry.resolve_or_defer(ModeTarget::Parent(3), || unreachable!());
        assert_eq!(found.unwrap().id, 1);
    }

    #[test]
    fn test_clear_pending_actions() {
        let registry = Registry::new();
        registry.defer_until_created(1, "a");
        registry.defer_until_created(2, "b");
        registry.defer_until_created_by_parent(9, "c");

        registry.clear_pending_actions(Some(1));
        assert_eq!(registry.pending_actions(ModeTarget::Id(1)), 0);
        assert_eq!(registry.pending_actions(ModeTarget::Id(2)), 1);

        registry.clear_pending_actions(None);
        assert_eq!(registry.pending_actions(ModeTarget::Id(2)), 0);
        assert_eq!(registry.pending_actions(ModeTarget::Parent(9)), 0);
    }

    #[test]
    fn test_remove_all() {
        let registry = Registry::new();
        registry.add(mode(1, None));
        registry.add(mode(2, None));

        let removed: Vec<_> = registry.remove_all().iter().map(|m| m.id).collect();
        assert_eq!(removed, vec![1, 2]);
        assert!(registry.is_empty());
        assert!(registry.topmost().is_none());
    }
}
