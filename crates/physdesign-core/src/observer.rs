//! Priority-ordered callbacks fired after an instance moves.

use crate::ids::InstanceId;
use crate::instance::PhysicalInstance;

/// Callback invoked with the moved instance.
///
/// Observers only get shared access to the moved instance, so they cannot
/// register further observers or move cells while a notification runs.
pub type PostInstanceMovedCallback = Box<dyn FnMut(InstanceId, &PhysicalInstance)>;

/// Opaque token returned on registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverHandle(u64);

struct Observer {
    priority: i32,
    handle: ObserverHandle,
    callback: PostInstanceMovedCallback,
}

/// Observers sorted ascending by priority; equal priorities keep
/// registration order.
#[derive(Default)]
pub struct ObserverList {
    observers: Vec<Observer>,
    next_handle: u64,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, priority: i32, callback: PostInstanceMovedCallback) -> ObserverHandle {
        let handle = ObserverHandle(self.next_handle);
        self.next_handle += 1;
        self.observers.push(Observer {
            priority,
            handle,
            callback,
        });
        // stable: ties stay in registration order
        self.observers.sort_by_key(|o| o.priority);
        handle
    }

    /// Unregister an observer. Returns `false` for an unknown handle.
    pub fn remove(&mut self, handle: ObserverHandle) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| o.handle != handle);
        self.observers.len() != before
    }

    /// Invoke every observer except `skip`, lowest priority first.
    pub fn notify(&mut self, id: InstanceId, instance: &PhysicalInstance, skip: Option<ObserverHandle>) {
        for observer in &mut self.observers {
            if Some(observer.handle) == skip {
                continue;
            }
            (observer.callback)(id, instance);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl std::fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList")
            .field(
                "priorities",
                &self.observers.iter().map(|o| o.priority).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Bounds;
    use crate::instance::PhysicalInstanceKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(log: &Rc<RefCell<Vec<i32>>>, tag: i32) -> PostInstanceMovedCallback {
        let log = Rc::clone(log);
        Box::new(move |_, _| log.borrow_mut().push(tag))
    }

    fn instance() -> PhysicalInstance {
        PhysicalInstance::new(PhysicalInstanceKind::Cell, Bounds::new(0, 0, 1, 1))
    }

    #[test]
    fn test_priority_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut list = ObserverList::new();
        list.add(5, recorder(&log, 5));
        list.add(1, recorder(&log, 1));
        list.add(3, recorder(&log, 3));
        list.notify(InstanceId::from_raw(0), &instance(), None);
        assert_eq!(*log.borrow(), vec![1, 3, 5]);
    }

    #[test]
    fn test_equal_priorities_keep_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut list = ObserverList::new();
        list.add(0, recorder(&log, 10));
        list.add(0, recorder(&log, 20));
        list.add(-1, recorder(&log, 30));
        list.notify(InstanceId::from_raw(0), &instance(), None);
        assert_eq!(*log.borrow(), vec![30, 10, 20]);
    }

    #[test]
    fn test_skip_and_remove() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut list = ObserverList::new();
        let a = list.add(1, recorder(&log, 1));
        let b = list.add(2, recorder(&log, 2));
        list.notify(InstanceId::from_raw(0), &instance(), Some(a));
        assert_eq!(*log.borrow(), vec![2]);
        assert!(list.remove(b));
        assert!(!list.remove(b));
        list.notify(InstanceId::from_raw(0), &instance(), None);
        assert_eq!(*log.borrow(), vec![2, 1]);
        assert_eq!(list.len(), 1);
    }
}
