use std::future::Future;
use std::sync::Arc;

use futures::future::select;
use futures::pin_mut;
use spin::Mutex;

use crate::counter::Counter;
use crate::error::{BoxError, Error};
use crate::signal::Signal;

/// A set of concurrently running tasks sharing one cancellation signal and
/// resolving to a single cause.
#[derive(Default, Clone)]
pub struct Group {
    counter: Counter,
    signal: Signal,
    resolved: Arc<Mutex<Option<Result<(), Error>>>>,
}

impl Group {
    /// A group rooted at a fresh signal that only the group itself cancels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives the group's signal from `parent`: canceling the parent cancels
    /// the group, even if no task is ever scheduled.
    pub fn with_parent(parent: &Signal) -> Self {
        Self {
            counter: Counter::default(),
            signal: parent.child(),
            resolved: Arc::default(),
        }
    }

    /// A clone of the group's own signal, e.g. to derive subgroups from it.
    pub fn signal(&self) -> Signal {
        self.signal.clone()
    }

    /// Schedules a task with no visibility into cancellation: once started it
    /// runs to natural completion, even after the group has resolved.
    pub fn run<F, E>(&self, task: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxError>,
    {
        let guard = self.counter.add();
        let signal = self.signal.clone();
        tokio::spawn(async move {
            let _guard = guard;
            if let Err(err) = task.await {
                signal.cancel_with(Error::task(err.into()));
            }
        });
    }

    /// Schedules a task given the group's signal. The task is expected to
    /// watch the signal and return promptly once it fires; nothing preempts a
    /// task that does not.
    pub fn go<F, Fut, E>(&self, task: F)
    where
        F: FnOnce(Signal) -> Fut,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxError>,
    {
        let guard = self.counter.add();
        let signal = self.signal.clone();
        let work = task(self.signal.clone());
        tokio::spawn(async move {
            let _guard = guard;
            if let Err(err) = work.await {
                signal.cancel_with(Error::task(err.into()));
            }
        });
    }

    /// Offers the explicit-cancel cause; a no-op if a cause is already
    /// latched.
    pub fn cancel(&self) {
        self.signal.cancel_with(Error::Canceled);
    }

    /// Resolves once every scheduled task has completed or the group's signal
    /// has fired, whichever happens first, and returns the latched cause. The
    /// outcome is computed once; later calls return the cached result without
    /// blocking.
    pub async fn wait(&self) -> Result<(), Error> {
        if let Some(result) = self.resolved.lock().clone() {
            return result;
        }

        let drained = self.counter.drained();
        let fired = self.signal.wait();
        pin_mut!(fired);
        select(drained, fired).await;

        // The cause is consulted on both arms: an erroring task latches
        // before it decrements, and a group with no outstanding work still
        // reports a cancellation that already fired.
        let outcome = match self.signal.cause() {
            Some(cause) => Err(cause),
            None => Ok(()),
        };

        let mut slot = self.resolved.lock();
        slot.get_or_insert_with(|| {
            tracing::debug!(ok = outcome.is_ok(), "group resolved");
            outcome
        })
        .clone()
    }
}
