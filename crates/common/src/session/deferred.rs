use std::future::Future;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// The state of a value that is still being produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource<T, E> {
    Pending,
    Ready(T),
    Failed(E),
}

impl<T, E> Resource<T, E> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Resource::Pending)
    }
}

/// Aborts the wrapped task when dropped
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// A value produced by a background task, readable at any time
///
/// Readers either take a snapshot with [`Deferred::current`] (to render a
/// progress indicator while `Pending`) or await settlement with
/// [`Deferred::wait`]. The result is published once and never changes.
#[derive(Debug, Clone)]
pub struct Deferred<T, E> {
    rx: watch::Receiver<Resource<T, E>>,
    abandoned: E,
}

impl<T, E> Deferred<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Run `fut` in the background and publish its outcome
    ///
    /// `abandoned` is reported if the producing task panics or is aborted
    /// before it settles.
    pub fn spawn<F>(fut: F, abandoned: E) -> (Self, JoinHandle<()>)
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(Resource::Pending);
        let on_panic = abandoned.clone();
        let handle = tokio::spawn(async move {
            // aborting the outer task drops the guard, which aborts the producer
            let mut producer = AbortOnDrop(tokio::spawn(fut));
            let resource = match (&mut producer.0).await {
                Ok(Ok(value)) => Resource::Ready(value),
                Ok(Err(e)) => Resource::Failed(e),
                Err(e) => {
                    tracing::error!("deferred task failed: {}", e);
                    Resource::Failed(on_panic)
                }
            };
            let _ = tx.send(resource);
        });
        (Self { rx, abandoned }, handle)
    }

    /// Snapshot of the current state
    pub fn current(&self) -> Resource<T, E> {
        self.rx.borrow().clone()
    }

    /// Wait until the value is ready or has failed
    pub async fn wait(&self) -> Result<T, E> {
        let mut rx = self.rx.clone();
        let settled = match rx.wait_for(|resource| !resource.is_pending()).await {
            Ok(resource) => resource.clone(),
            Err(_) => return Err(self.abandoned.clone()),
        };
        match settled {
            Resource::Ready(value) => Ok(value),
            Resource::Failed(e) => Err(e),
            Resource::Pending => Err(self.abandoned.clone()),
        }
    }
}
