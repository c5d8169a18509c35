use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

/// Outcome of one step of a worker's computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Done,
}

/// A dedicated thread that repeatedly invokes a step function until closed
/// or until the step reports [`Step::Done`].
///
/// Closing is cooperative: the flag is checked before every step, so a step
/// that waits on a queue must use a bounded wait for `close()` to return
/// promptly.
pub struct Worker {
    closing: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    pub fn spawn<F>(name: &str, mut step: F) -> Self
    where
        F: FnMut() -> Step + Send + 'static,
    {
        let closing = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&closing);
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                while !flag.load(Ordering::Acquire) {
                    if step() == Step::Done {
                        break;
                    }
                }
            })
            .expect("failed to spawn worker thread");

        Self {
            closing,
            handle: Some(handle),
        }
    }

    /// Sets the closing flag and blocks until the thread has exited.
    /// No step begins after this returns. Idempotent.
    pub fn close(&mut self) {
        self.closing.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.close();
    }
}
