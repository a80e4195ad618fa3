use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Poll, Waker};

use spin::Mutex;

// One-shot future completed through a weak handle to its state; shared by the
// cancellation signal and the outstanding-work counter.
pub(crate) struct Waiter(Arc<Mutex<State>>);

impl Waiter {
    pub(crate) fn pending() -> Self {
        Self(Arc::new(Mutex::new(State::Idle)))
    }

    pub(crate) fn ready() -> Self {
        Self(Arc::new(Mutex::new(State::Done)))
    }

    pub(crate) fn weak(&self) -> Weak<Mutex<State>> {
        Arc::downgrade(&self.0)
    }
}

impl Future for Waiter {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut std::task::Context<'_>) -> Poll<Self::Output> {
        let mut guard = self.0.lock();

        match &*guard {
            State::Done => Poll::Ready(()),
            _ => {
                *guard = State::Waiting(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

pub(crate) enum State {
    Idle,
    Waiting(Waker),
    Done,
}

impl State {
    pub(crate) fn complete(&mut self) {
        let previous = std::mem::replace(self, Self::Done);
        if let Self::Waiting(waker) = previous {
            waker.wake()
        }
    }
}
