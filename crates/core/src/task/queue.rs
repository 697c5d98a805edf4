//! FIFO buffer between ingestion and the orchestrator.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::info;

use crate::metrics::{TASKS_RECEIVED, TASK_QUEUE_DEPTH};

use super::types::TargetTask;

/// Unbounded FIFO of pending tasks.
///
/// Cloning yields another handle to the same queue. Pushing never waits on
/// the consumer; the lock is only held for the push or pop itself.
#[derive(Debug, Clone, Default)]
pub struct TaskQueue {
    inner: Arc<Mutex<VecDeque<TargetTask>>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task. Returns the queue length after the push.
    pub fn push(&self, task: TargetTask) -> usize {
        let mut queue = self.lock();
        info!("Received new target {}", task.id);
        queue.push_back(task);
        TASKS_RECEIVED.inc();
        TASK_QUEUE_DEPTH.set(queue.len() as i64);
        queue.len()
    }

    /// Remove and return the oldest task.
    pub fn pop(&self) -> Option<TargetTask> {
        let mut queue = self.lock();
        let task = queue.pop_front();
        TASK_QUEUE_DEPTH.set(queue.len() as i64);
        task
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<TargetTask>> {
        // A panic while holding the lock cannot leave the deque half-updated.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::StampedPose;
    use crate::task::TargetPoses;
    use chrono::Utc;

    fn task() -> TargetTask {
        let pose = StampedPose::new(Default::default(), Utc::now());
        TargetTask::new(TargetPoses {
            approach: pose,
            pick: pose,
            retreat: pose,
            place: pose,
        })
    }

    #[test]
    fn test_fifo_order() {
        let queue = TaskQueue::new();
        let first = task();
        let second = task();
        queue.push(first.clone());
        queue.push(second.clone());

        assert_eq!(queue.pop().unwrap().id, first.id);
        assert_eq!(queue.pop().unwrap().id, second.id);
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let producer = TaskQueue::new();
        let consumer = producer.clone();
        assert!(consumer.is_empty());

        assert_eq!(producer.push(task()), 1);
        assert_eq!(producer.push(task()), 2);
        assert_eq!(consumer.len(), 2);

        consumer.pop();
        assert_eq!(producer.len(), 1);
    }

    #[test]
    fn test_push_from_other_threads() {
        let queue = TaskQueue::new();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let queue = queue.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        queue.push(task());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(queue.len(), 100);
    }
}
