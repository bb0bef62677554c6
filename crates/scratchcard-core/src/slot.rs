use std::cell::RefCell;
use std::rc::Rc;

/// Shared, releasable ownership of a value.
///
/// Async work captures a clone of the slot; once the owner releases it,
/// `with` returns `None` and the late work becomes a no-op.
#[derive(Debug)]
pub struct Slot<T>(Rc<RefCell<Option<T>>>);

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Slot<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(Some(value))))
    }

    pub fn release(&self) -> Option<T> {
        self.0.borrow_mut().take()
    }

    pub fn is_live(&self) -> bool {
        self.0.borrow().is_some()
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.0.borrow_mut().as_mut().map(f)
    }
}
