//! Deadlines for outstanding hardware requests.
//!
//! All deadlines of one controller share a single worker thread that drives
//! a current-thread runtime with only the timer enabled. Each deadline is a
//! `tokio::time::sleep` task that is aborted when its [`Deadline`] handle is
//! dropped, so a request resolved or superseded early costs nothing further.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::runtime::{Builder, Handle};
use tokio::sync::oneshot;
use tokio::task::AbortHandle;

/// Armed deadline. Dropping it cancels the pending task.
#[derive(Debug)]
pub struct Deadline(AbortHandle);

impl Drop for Deadline {
    fn drop(&mut self) {
        self.0.abort();
    }
}

struct Armed(Arc<AtomicUsize>);

impl Drop for Armed {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct DeadlineTimer {
    handle: Handle,
    armed: Arc<AtomicUsize>,
    // Dropping the sender lets the worker leave `block_on` and shut down.
    _shutdown: oneshot::Sender<()>,
}

impl DeadlineTimer {
    pub fn start() -> io::Result<Self> {
        let runtime = Builder::new_current_thread().enable_time().build()?;
        let handle = runtime.handle().clone();
        let (shutdown, stopped) = oneshot::channel::<()>();

        thread::Builder::new()
            .name("saycheese-deadlines".to_string())
            .spawn(move || {
                let _ = runtime.block_on(stopped);
                log::debug!("Deadline worker stopped");
            })?;

        Ok(Self {
            handle,
            armed: Arc::new(AtomicUsize::new(0)),
            _shutdown: shutdown,
        })
    }

    /// Run `task` once `delay` has elapsed unless the returned handle is
    /// dropped first.
    pub fn after<F>(&self, delay: Duration, task: F) -> Deadline
    where
        F: FnOnce() + Send + 'static,
    {
        self.armed.fetch_add(1, Ordering::SeqCst);
        let armed = Armed(self.armed.clone());
        let join = self.handle.spawn(async move {
            let _armed = armed;
            tokio::time::sleep(delay).await;
            task();
        });
        Deadline(join.abort_handle())
    }

    /// Deadline tasks that have neither fired nor been torn down yet.
    pub fn armed(&self) -> usize {
        self.armed.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Instant;

    fn wait_until(timeout: Duration, done: impl Fn() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < timeout {
            if done() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        done()
    }

    #[test]
    fn test_deadline_fires_after_delay() {
        let timer = DeadlineTimer::start().unwrap();
        let (tx, rx) = mpsc::channel();
        let start = Instant::now();
        let _deadline = timer.after(Duration::from_millis(20), move || {
            tx.send(()).unwrap();
        });

        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert!(wait_until(Duration::from_secs(1), || timer.armed() == 0));
    }

    #[test]
    fn test_dropped_deadline_never_fires() {
        let timer = DeadlineTimer::start().unwrap();
        let (tx, rx) = mpsc::channel::<()>();
        let deadline = timer.after(Duration::from_millis(20), move || {
            let _ = tx.send(());
        });
        drop(deadline);

        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        assert_eq!(timer.armed(), 0);
    }

    #[test]
    fn test_many_deadlines_share_one_worker() {
        let timer = DeadlineTimer::start().unwrap();
        let deadlines: Vec<_> = (0..500)
            .map(|_| timer.after(Duration::from_secs(60), || {}))
            .collect();
        assert_eq!(timer.armed(), 500);

        drop(deadlines);
        assert!(wait_until(Duration::from_secs(2), || timer.armed() == 0));
    }
}
