//! Task groups over tokio with hierarchical, cause-carrying cancellation:
//! a [`Group`] schedules tasks, and [`Group::wait`] resolves as soon as all
//! of them finished or the group's [`Signal`] fired, whichever happens first.

pub mod error;
pub mod group;
pub mod signal;

pub(crate) mod counter;
pub(crate) mod waiter;

pub use error::{BoxError, Error};
pub use group::Group;
pub use signal::Signal;
