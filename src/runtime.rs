//! Runtime abstraction for background work
//!
//! Feed requests and tile downloads are spawned through [`spawn`] so the
//! library never names a concrete executor at call sites. The default
//! spawner runs on tokio; the viewer installs one bound to its runtime
//! handle so tasks can be spawned from the UI thread.

use futures::future::BoxFuture;
use std::sync::OnceLock;

/// Spawns boxed futures on some executor
pub trait AsyncSpawner: Send + Sync + 'static {
    fn spawn_boxed(&self, future: BoxFuture<'static, ()>) -> Box<dyn AsyncHandle>;
}

/// Handle to a spawned task
pub trait AsyncHandle: Send + Sync {
    fn is_finished(&self) -> bool;

    fn cancel(&self);
}

/// Spawn a task on the installed runtime
pub fn spawn<F>(future: F) -> Box<dyn AsyncHandle>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    runtime().spawn_boxed(Box::pin(future))
}

pub mod spawners {
    use super::*;
    use tokio::runtime::Handle;
    use tokio::task::JoinHandle;

    /// Spawns onto the tokio runtime of the calling context, or onto a fixed
    /// handle when one was supplied.
    #[derive(Default)]
    pub struct TokioSpawner {
        handle: Option<Handle>,
    }

    impl TokioSpawner {
        pub fn with_handle(handle: Handle) -> Self {
            Self {
                handle: Some(handle),
            }
        }
    }

    impl AsyncSpawner for TokioSpawner {
        fn spawn_boxed(&self, future: BoxFuture<'static, ()>) -> Box<dyn AsyncHandle> {
            let handle = match (&self.handle, Handle::try_current()) {
                (Some(handle), _) => Some(handle.spawn(future)),
                (None, Ok(current)) => Some(current.spawn(future)),
                (None, Err(e)) => {
                    log::error!("no tokio runtime available, task dropped: {}", e);
                    None
                }
            };
            Box::new(TokioHandle(handle))
        }
    }

    struct TokioHandle(Option<JoinHandle<()>>);

    impl AsyncHandle for TokioHandle {
        fn is_finished(&self) -> bool {
            self.0.as_ref().map_or(true, |h| h.is_finished())
        }

        fn cancel(&self) {
            if let Some(handle) = &self.0 {
                handle.abort();
            }
        }
    }
}

static RUNTIME: OnceLock<Box<dyn AsyncSpawner>> = OnceLock::new();

/// Install a spawner. Only the first call takes effect; returns whether
/// this call installed it.
pub fn init_runtime(spawner: Box<dyn AsyncSpawner>) -> bool {
    RUNTIME.set(spawner).is_ok()
}

/// Get the installed spawner, defaulting to tokio
pub fn runtime() -> &'static dyn AsyncSpawner {
    RUNTIME
        .get_or_init(|| Box::new(spawners::TokioSpawner::default()))
        .as_ref()
}
