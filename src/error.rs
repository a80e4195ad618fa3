use std::sync::Arc;

/// Boxed error currency accepted from scheduled tasks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The first cause latched by a group; returned by every `wait` call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The group (or its own signal) was canceled explicitly.
    #[error("group canceled")]
    Canceled,
    /// The parent signal the group was derived from fired.
    #[error("group parent signal canceled")]
    ParentCanceled,
    /// A task reported this error; the first reporter wins.
    #[error(transparent)]
    Task(Arc<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub(crate) fn task(err: BoxError) -> Self {
        Self::Task(Arc::from(err))
    }
}
