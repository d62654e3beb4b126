use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

use crate::types::UrlTask;

/// FIFO of pending URL tasks shared by the worker pool. Depth rides on the
/// task, so dequeue order alone gives BFS discipline.
#[derive(Default)]
pub struct Frontier {
    queue: Mutex<VecDeque<UrlTask>>,
    notify: Notify,
    pending: AtomicUsize,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queued tasks not yet dequeued.
    pub fn size(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Tasks enqueued but not yet marked done (includes in-flight ones).
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Relaxed)
    }

    pub fn enqueue(&self, task: UrlTask) {
        self.queue.lock().push_back(task);
        self.pending.fetch_add(1, Ordering::Relaxed);
        self.notify.notify_one();
    }

    /// Wait until a task is available. Callers bound the wait with
    /// `tokio::time::timeout` to detect natural exhaustion.
    pub async fn dequeue(&self) -> UrlTask {
        loop {
            if let Some(task) = self.queue.lock().pop_front() {
                return task;
            }
            self.notify.notified().await;
        }
    }

    pub fn task_done(&self) {
        self.pending.fetch_sub(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(url: &str, depth: usize) -> UrlTask {
        UrlTask {
            url: url.to_string(),
            depth,
            parent: None,
        }
    }

    #[tokio::test]
    async fn fifo_order() {
        let f = Frontier::new();
        f.enqueue(task("a", 0));
        f.enqueue(task("b", 0));
        f.enqueue(task("c", 1));
        assert_eq!(f.size(), 3);
        assert_eq!(f.dequeue().await.url, "a");
        assert_eq!(f.dequeue().await.url, "b");
        assert_eq!(f.dequeue().await.url, "c");
        assert!(f.is_empty());
    }

    #[tokio::test]
    async fn pending_tracks_unfinished_tasks() {
        let f = Frontier::new();
        f.enqueue(task("a", 0));
        f.enqueue(task("b", 0));
        let _ = f.dequeue().await;
        assert_eq!(f.pending(), 2);
        f.task_done();
        assert_eq!(f.pending(), 1);
    }

    #[tokio::test]
    async fn dequeue_wakes_on_enqueue() {
        use std::sync::Arc;
        let f = Arc::new(Frontier::new());
        let waiter = {
            let f = Arc::clone(&f);
            tokio::spawn(async move { f.dequeue().await.url })
        };
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        f.enqueue(task("late", 0));
        assert_eq!(waiter.await.unwrap(), "late");
    }
}
