use std::time::Duration;

use tokio::{sync::mpsc, task::JoinHandle, time::Instant};

/// A delayed task that can be cancelled before it runs.
pub struct TaskHandle {
    id: u64,
    join: JoinHandle<()>,
}

impl TaskHandle {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Runs `task` once `delay` has elapsed, unless cancelled first. The delay
/// counts from this call, not from when the spawned task is first polled.
pub fn schedule<F>(id: u64, delay: Duration, task: F) -> TaskHandle
where
    F: Future<Output = ()> + Send + 'static,
{
    let deadline = Instant::now() + delay;
    let join = tokio::spawn(async move {
        tokio::time::sleep_until(deadline).await;
        task.await;
    });
    TaskHandle { id, join }
}

pub fn cancel(handle: TaskHandle) {
    handle.join.abort();
}

/// Quiet-period timer: every `rearm` replaces the pending expiry.
///
/// Expiry is delivered as a message on the owner's inbox rather than as a
/// callback. The timer only holds a weak sender so it never keeps the inbox
/// alive on its own.
pub struct Debounce {
    delay: Duration,
    next_id: u64,
    armed: Option<TaskHandle>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_id: 0,
            armed: None,
        }
    }

    pub fn rearm<M, F>(&mut self, inbox: &mpsc::WeakUnboundedSender<M>, expired: F)
    where
        M: Send + 'static,
        F: FnOnce(u64) -> M + Send + 'static,
    {
        self.cancel();

        self.next_id += 1;
        let id = self.next_id;
        let inbox = inbox.clone();
        self.armed = Some(schedule(id, self.delay, async move {
            if let Some(tx) = inbox.upgrade() {
                let _ = tx.send(expired(id));
            }
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.armed.take() {
            cancel(handle);
        }
    }

    /// Accepts an expiry message. Returns `false` for a timer that was
    /// superseded after its message had already been queued.
    pub fn fire(&mut self, id: u64) -> bool {
        match &self.armed {
            Some(handle) if handle.id() == id => {
                self.armed = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }
}

impl Drop for Debounce {
    fn drop(&mut self) {
        self.cancel();
    }
}
