use std::future::Future;
use std::ops::DerefMut;
use std::sync::{Arc, Weak};

use spin::{Mutex, MutexGuard};

use crate::error::Error;
use crate::waiter::{State, Waiter};

/// A node in a cancellation tree. Done-ness is permanent, carries a cause,
/// and propagates to every child derived from this node.
#[derive(Default, Clone)]
pub struct Signal(Arc<Mutex<Inner>>);

impl Signal {
    /// A root signal, live until someone cancels it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives a child signal. A child of an already-done parent is born done
    /// with the parent-cancellation cause.
    pub fn child(&self) -> Self {
        let mut inner = self.inner();

        match &mut *inner {
            Inner::Live { children, .. } => {
                let child = Self::new();
                children.push(child.weak());
                child
            }
            Inner::Done(_) => Self(Arc::new(Mutex::new(Inner::Done(Error::ParentCanceled)))),
        }
    }

    /// Cancels this node and, transitively, every live descendant.
    pub fn cancel(&self) {
        self.cancel_with(Error::Canceled);
    }

    // Write-once: the first cause to arrive is kept, later calls are no-ops.
    pub(crate) fn cancel_with(&self, cause: Error) {
        let mut inner = self.inner();
        if inner.is_done() {
            return;
        }
        tracing::debug!(%cause, "cancellation signal fired");

        let live = std::mem::replace(inner.deref_mut(), Inner::Done(cause));
        let (waiters, children) = match live {
            Inner::Live { waiters, children } => (waiters, children),
            Inner::Done(_) => {
                unreachable!()
            }
        };

        children
            .into_iter()
            .filter_map(|x| x.upgrade())
            .map(Self)
            .for_each(|x| x.cancel_with(Error::ParentCanceled));

        waiters
            .into_iter()
            .filter_map(|x| x.upgrade())
            .for_each(|x| x.lock().complete());
    }

    pub fn is_done(&self) -> bool {
        self.inner().is_done()
    }

    /// The latched cause, once done.
    pub fn cause(&self) -> Option<Error> {
        match &*self.inner() {
            Inner::Live { .. } => None,
            Inner::Done(cause) => Some(cause.clone()),
        }
    }

    /// Resolves when this node is done; immediately ready if it already is.
    pub fn wait(&self) -> impl Future<Output = ()> {
        let mut inner = self.inner();

        let waiters = match inner.deref_mut() {
            Inner::Live { waiters, .. } => waiters,
            Inner::Done(_) => return Waiter::ready(),
        };
        let waiter = Waiter::pending();
        waiters.push(waiter.weak());
        waiter
    }

    fn inner(&self) -> MutexGuard<Inner> {
        self.0.lock()
    }

    fn weak(&self) -> Weak<Mutex<Inner>> {
        Arc::downgrade(&self.0)
    }
}

enum Inner {
    Live {
        waiters: Vec<Weak<Mutex<State>>>,
        children: Vec<Weak<Mutex<Inner>>>,
    },
    Done(Error),
}

impl Inner {
    fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }
}

impl Default for Inner {
    fn default() -> Self {
        Self::Live {
            waiters: vec![],
            children: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cause_latches_once() {
        let root = Signal::new();
        assert!(!root.is_done());
        assert!(root.cause().is_none());

        root.cancel();
        root.cancel();
        assert!(root.is_done());
        assert!(matches!(root.cause(), Some(Error::Canceled)));
    }

    #[test]
    fn child_of_done_parent_is_born_done() {
        let root = Signal::new();
        root.cancel();

        let child = root.child();
        assert!(child.is_done());
        assert!(matches!(child.cause(), Some(Error::ParentCanceled)));
    }

    #[test]
    fn propagation_marks_descendants_as_parent_canceled() {
        let root = Signal::new();
        let child = root.child();
        let grandchild = child.child();

        root.cancel();
        assert!(matches!(root.cause(), Some(Error::Canceled)));
        assert!(matches!(child.cause(), Some(Error::ParentCanceled)));
        assert!(matches!(grandchild.cause(), Some(Error::ParentCanceled)));
    }

    #[test]
    fn done_child_keeps_its_own_cause() {
        let root = Signal::new();
        let child = root.child();

        child.cancel();
        root.cancel();
        assert!(matches!(child.cause(), Some(Error::Canceled)));
    }
}
