use std::sync::{Arc, Weak};

use spin::Mutex;

use crate::waiter::{State, Waiter};

// Outstanding-work counter. Incremented when a task is scheduled, decremented
// by dropping the guard; the decrement that reaches zero wakes every
// registered drain-waiter.
#[derive(Default, Clone)]
pub(crate) struct Counter(Arc<Mutex<Inner>>);

impl Counter {
    pub(crate) fn add(&self) -> CounterGuard {
        self.0.lock().outstanding += 1;
        CounterGuard(self.0.clone())
    }

    pub(crate) fn drained(&self) -> Waiter {
        let mut inner = self.0.lock();
        if inner.outstanding == 0 {
            return Waiter::ready();
        }

        let waiter = Waiter::pending();
        inner.waiters.retain(|x| x.strong_count() > 0);
        inner.waiters.push(waiter.weak());
        waiter
    }
}

pub(crate) struct CounterGuard(Arc<Mutex<Inner>>);

impl Drop for CounterGuard {
    fn drop(&mut self) {
        let mut inner = self.0.lock();

        debug_assert!(inner.outstanding > 0, "outstanding count underflow");
        inner.outstanding -= 1;

        if inner.outstanding == 0 {
            inner
                .waiters
                .drain(..)
                .filter_map(|x| x.upgrade())
                .for_each(|x| x.lock().complete());
        }
    }
}

#[derive(Default)]
struct Inner {
    outstanding: usize,
    waiters: Vec<Weak<Mutex<State>>>,
}
