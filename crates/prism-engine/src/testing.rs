//! Test helpers.

use std::cell::RefCell;
use std::rc::Rc;

/// Records the order in which tracked values are dropped.
#[derive(Default, Clone)]
pub(crate) struct DropLog(Rc<RefCell<Vec<&'static str>>>);

impl DropLog {
    pub(crate) fn track(&self, name: &'static str) -> Tracked {
        Tracked { name, log: self.clone() }
    }

    pub(crate) fn order(&self) -> Vec<&'static str> {
        self.0.borrow().clone()
    }
}

/// Pushes its name onto the owning [`DropLog`] when dropped.
pub(crate) struct Tracked {
    name: &'static str,
    log: DropLog,
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.log.0.borrow_mut().push(self.name);
    }
}
