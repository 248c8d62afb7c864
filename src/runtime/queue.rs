use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

type Task = Box<dyn FnOnce()>;

/// Single-threaded "run on next tick" queue.
///
/// Tasks run in FIFO order; anything posted while draining runs later in the
/// same drain. Each drain bumps [`EventQueue::generation`] so per-drain
/// budgets can reset. Tasks posted with [`EventQueue::post_next_drain`] are
/// held back and run first in the following drain.
#[derive(Default)]
pub struct EventQueue {
    tasks: RefCell<VecDeque<(&'static str, Task)>>,
    deferred: RefCell<VecDeque<(&'static str, Task)>>,
    generation: Cell<u64>,
    draining: Cell<bool>,
}

impl EventQueue {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn post<F>(&self, label: &'static str, task: F)
    where
        F: FnOnce() + 'static,
    {
        self.tasks.borrow_mut().push_back((label, Box::new(task)));
    }

    /// Hold `task` back until the next drain starts, even when posted from
    /// inside a running drain.
    pub fn post_next_drain<F>(&self, label: &'static str, task: F)
    where
        F: FnOnce() + 'static,
    {
        self.deferred.borrow_mut().push_back((label, Box::new(task)));
    }

    /// Tasks waiting for a drain, held-back ones included.
    pub fn pending(&self) -> usize {
        self.deferred.borrow().len() + self.tasks.borrow().len()
    }

    /// Labels in the order the next drain would run them.
    pub fn pending_labels(&self) -> Vec<&'static str> {
        let deferred = self.deferred.borrow();
        let tasks = self.tasks.borrow();
        deferred
            .iter()
            .chain(tasks.iter())
            .map(|(label, _)| *label)
            .collect()
    }

    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    pub fn is_draining(&self) -> bool {
        self.draining.get()
    }

    /// Run tasks until the queue is empty and return how many ran.
    ///
    /// A nested call from inside a task returns 0; the outer drain picks up
    /// whatever was posted.
    pub fn drain(&self) -> usize {
        if self.draining.replace(true) {
            return 0;
        }
        self.generation.set(self.generation.get().wrapping_add(1));
        {
            let mut deferred = self.deferred.borrow_mut();
            let mut tasks = self.tasks.borrow_mut();
            while let Some(task) = deferred.pop_back() {
                tasks.push_front(task);
            }
        }

        let mut ran = 0;
        loop {
            let next = self.tasks.borrow_mut().pop_front();
            let Some((_, task)) = next else {
                break;
            };
            task();
            ran += 1;
        }

        self.draining.set(false);
        ran
    }
}
