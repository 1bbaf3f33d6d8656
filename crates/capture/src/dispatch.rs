//! Execution context for view and overlay mutations.
//!
//! Overlays must only be touched on the thread the rendering surface is bound
//! to. Callers hand work to a [`ViewDispatcher`] and wait for it to finish.

use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle, ThreadId};

use crossbeam_channel::{Receiver, Sender};

/// Unit of work for the view context.
pub type ViewTask = Box<dyn FnOnce() + Send + 'static>;

pub trait ViewDispatcher: Send + Sync {
    /// Run `task` on the view context and return after it completed.
    fn run(&self, task: ViewTask);
}

/// Run `f` on the view context and hand back its result.
///
/// Returns `None` if the dispatcher could not run the task.
pub fn run_on_view<T, F>(dispatcher: &dyn ViewDispatcher, f: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = crossbeam_channel::bounded(1);
    dispatcher.run(Box::new(move || {
        let _ = tx.send(f());
    }));
    rx.try_recv().ok()
}

/// Runs tasks on the calling thread.
///
/// For hosts whose commands already arrive on the view thread, and for tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineDispatcher;

impl ViewDispatcher for InlineDispatcher {
    fn run(&self, task: ViewTask) {
        task();
    }
}

enum ViewJob {
    Run { task: ViewTask, done: Sender<()> },
    Shutdown,
}

/// Owns a dedicated view thread and funnels every task onto it.
pub struct ThreadDispatcher {
    jobs: Sender<ViewJob>,
    view_thread: ThreadId,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ThreadDispatcher {
    pub fn spawn(name: &str) -> std::io::Result<Self> {
        let (jobs, rx) = crossbeam_channel::unbounded::<ViewJob>();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || view_loop(rx))?;

        Ok(Self {
            jobs,
            view_thread: handle.thread().id(),
            handle: Mutex::new(Some(handle)),
        })
    }

    pub fn is_view_thread(&self) -> bool {
        thread::current().id() == self.view_thread
    }
}

fn view_loop(rx: Receiver<ViewJob>) {
    tracing::debug!("view dispatcher started");
    while let Ok(job) = rx.recv() {
        match job {
            ViewJob::Run { task, done } => {
                task();
                let _ = done.send(());
            }
            ViewJob::Shutdown => break,
        }
    }
    tracing::debug!("view dispatcher stopped");
}

impl ViewDispatcher for ThreadDispatcher {
    fn run(&self, task: ViewTask) {
        // Re-entrant call from a task already on the view thread.
        if self.is_view_thread() {
            task();
            return;
        }

        let (done, finished) = crossbeam_channel::bounded(1);
        if self.jobs.send(ViewJob::Run { task, done }).is_err() {
            tracing::warn!("view dispatcher is gone, task dropped");
            return;
        }
        // Disconnects instead of hanging if the task panicked.
        let _ = finished.recv();
    }
}

impl Drop for ThreadDispatcher {
    fn drop(&mut self) {
        let _ = self.jobs.send(ViewJob::Shutdown);
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}
