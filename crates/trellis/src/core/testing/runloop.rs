use std::{cell::Cell, rc::Rc};

use crate::core::scheduler::RunLoop;

/// A run loop whose checkpoint is fired by hand. Clones share the request
/// counter, so a test can keep one and give the other to the core.
#[derive(Debug, Clone, Default)]
pub struct ManualLoop {
    /// Number of checkpoint requests received.
    requests: Rc<Cell<usize>>,
}

impl ManualLoop {
    /// Construct a loop with no requests.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of checkpoint requests received so far.
    pub fn requests(&self) -> usize {
        self.requests.get()
    }
}

impl RunLoop for ManualLoop {
    fn request_checkpoint(&mut self) {
        self.requests.set(self.requests.get() + 1);
    }
}
