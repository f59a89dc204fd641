//! Runtime abstraction layer for fire-and-forget async work
//!
//! Tile fetches are spawned through [`AsyncSpawner`] so the control loop never
//! awaits them and never depends on a particular executor. Production code
//! uses the tokio spawner; tests and headless tools can use
//! [`spawners::queued::QueuedSpawner`] to run fetches at a moment of their
//! choosing.

use crate::prelude::{Future, Pin};

/// Boxed future as handed to a spawner
pub type BoxedTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// A trait for spawning async tasks (object-safe version)
pub trait AsyncSpawner: Send + Sync + 'static {
    /// Spawn a future and return a handle to it
    fn spawn_boxed(&self, future: BoxedTask) -> Box<dyn AsyncHandle>;
}

/// Handle to a spawned async task
pub trait AsyncHandle: Send + Sync {
    /// Check if the task is finished
    fn is_finished(&self) -> bool;

    /// Cancel the task. A cancelled task never runs to completion; a task
    /// that already finished is unaffected.
    fn cancel(&self);
}

/// Convenience wrapper for spawning with type inference
pub fn spawn_on<F>(spawner: &dyn AsyncSpawner, future: F) -> Box<dyn AsyncHandle>
where
    F: Future<Output = ()> + Send + 'static,
{
    spawner.spawn_boxed(Box::pin(future))
}

/// Default spawner implementations
pub mod spawners {
    use super::*;

    #[cfg(feature = "tokio-runtime")]
    pub mod tokio_impl {
        use super::*;
        use ::tokio::runtime::Handle;
        use ::tokio::task::JoinHandle;

        /// Tokio-based async spawner bound to a runtime handle
        #[derive(Debug, Clone)]
        pub struct TokioSpawner {
            handle: Handle,
        }

        impl TokioSpawner {
            pub fn new(handle: Handle) -> Self {
                Self { handle }
            }

            /// Spawner for the runtime the caller is running on, if any
            pub fn current() -> Option<Self> {
                Handle::try_current().ok().map(Self::new)
            }
        }

        impl AsyncSpawner for TokioSpawner {
            fn spawn_boxed(&self, future: BoxedTask) -> Box<dyn AsyncHandle> {
                let handle = self.handle.spawn(future);
                Box::new(TokioHandle(handle))
            }
        }

        struct TokioHandle(JoinHandle<()>);

        impl AsyncHandle for TokioHandle {
            fn is_finished(&self) -> bool {
                self.0.is_finished()
            }

            fn cancel(&self) {
                self.0.abort();
            }
        }
    }

    pub mod queued {
        use super::*;
        use std::collections::VecDeque;
        use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
        use std::sync::{Arc, Mutex};

        #[derive(Default)]
        struct TaskFlags {
            cancelled: AtomicBool,
            finished: AtomicBool,
        }

        struct QueuedTask {
            future: BoxedTask,
            flags: Arc<TaskFlags>,
        }

        /// Holds spawned futures until [`QueuedSpawner::run_pending`] drives
        /// them, one at a time, on the calling thread. Cancelled tasks are
        /// dropped without being polled.
        #[derive(Default, Clone)]
        pub struct QueuedSpawner {
            queue: Arc<Mutex<VecDeque<QueuedTask>>>,
            spawned: Arc<AtomicUsize>,
        }

        impl QueuedSpawner {
            pub fn new() -> Self {
                Self::default()
            }

            /// Total number of tasks ever spawned
            pub fn spawned_count(&self) -> usize {
                self.spawned.load(Ordering::SeqCst)
            }

            /// Tasks waiting to run, cancelled ones included
            pub fn queued_len(&self) -> usize {
                self.queue.lock().map(|q| q.len()).unwrap_or(0)
            }

            /// Runs every queued task to completion and returns how many
            /// actually ran. Tasks spawned while running are picked up too.
            pub fn run_pending(&self) -> usize {
                let mut ran = 0;
                loop {
                    let next = match self.queue.lock() {
                        Ok(mut queue) => queue.pop_front(),
                        Err(_) => None,
                    };
                    let Some(task) = next else {
                        break;
                    };
                    if task.flags.cancelled.load(Ordering::SeqCst) {
                        continue;
                    }
                    futures::executor::block_on(task.future);
                    task.flags.finished.store(true, Ordering::SeqCst);
                    ran += 1;
                }
                ran
            }
        }

        impl AsyncSpawner for QueuedSpawner {
            fn spawn_boxed(&self, future: BoxedTask) -> Box<dyn AsyncHandle> {
                let flags = Arc::new(TaskFlags::default());
                if let Ok(mut queue) = self.queue.lock() {
                    queue.push_back(QueuedTask {
                        future,
                        flags: Arc::clone(&flags),
                    });
                }
                self.spawned.fetch_add(1, Ordering::SeqCst);
                Box::new(QueuedHandle(flags))
            }
        }

        struct QueuedHandle(Arc<TaskFlags>);

        impl AsyncHandle for QueuedHandle {
            fn is_finished(&self) -> bool {
                self.0.finished.load(Ordering::SeqCst)
            }

            fn cancel(&self) {
                self.0.cancelled.store(true, Ordering::SeqCst);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::spawners::queued::QueuedSpawner;
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_queued_spawner_defers_until_run() {
        let spawner = QueuedSpawner::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&counter);
        let handle = spawn_on(&spawner, async move {
            c.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(!handle.is_finished());

        assert_eq!(spawner.run_pending(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(handle.is_finished());
    }

    #[test]
    fn test_cancelled_task_never_runs() {
        let spawner = QueuedSpawner::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&counter);
        let handle = spawn_on(&spawner, async move {
            c.fetch_add(1, Ordering::SeqCst);
        });
        handle.cancel();

        assert_eq!(spawner.run_pending(), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(spawner.spawned_count(), 1);
        assert_eq!(spawner.queued_len(), 0);
    }

    #[cfg(feature = "tokio-runtime")]
    #[tokio::test]
    async fn test_tokio_spawner_runs_task() {
        use super::spawners::tokio_impl::TokioSpawner;

        let spawner = TokioSpawner::current().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel();
        spawn_on(&spawner, async move {
            let _ = tx.send(42);
        });
        assert_eq!(rx.await.unwrap(), 42);
    }
}
