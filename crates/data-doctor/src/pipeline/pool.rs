//! Fixed-size worker pool for chunk units.
//!
//! Jobs go through one shared queue; each idle worker takes the next job. The
//! pool never spawns more threads than it was built with, so submitting every
//! chunk up front only grows the queue.

use crate::error::{QualityError, Result};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

type Job = Box<dyn FnOnce() + Send + 'static>;

pub struct WorkerPool {
    sender: Mutex<Option<mpsc::Sender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    size: usize,
}

impl WorkerPool {
    /// Spawn `size` workers. Fails if the OS refuses a thread.
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(QualityError::WorkerPool(
                "pool needs at least one worker".to_string(),
            ));
        }

        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));
        let mut workers = Vec::with_capacity(size);

        for id in 0..size {
            let receiver = Arc::clone(&receiver);
            let handle = thread::Builder::new()
                .name(format!("data-doctor-worker-{id}"))
                .spawn(move || worker_loop(id, receiver))
                .map_err(|e| {
                    QualityError::WorkerPool(format!("failed to spawn worker {id}: {e}"))
                })?;
            workers.push(handle);
        }

        debug!("Started worker pool with {} threads", size);
        Ok(Self {
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
            size,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Queue a job. Fails once the pool has been shut down.
    pub fn submit<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let guard = self.sender.lock();
        let sender = guard
            .as_ref()
            .ok_or_else(|| QualityError::WorkerPool("pool is shut down".to_string()))?;
        sender
            .send(Box::new(job))
            .map_err(|_| QualityError::WorkerPool("all workers have exited".to_string()))
    }

    /// Stop accepting work, let queued jobs finish and join every worker.
    /// Calling it again is a no-op.
    pub fn shutdown(&self) {
        // Dropping the sender ends each worker's recv loop once the queue drains
        drop(self.sender.lock().take());

        let handles: Vec<JoinHandle<()>> = self.workers.lock().drain(..).collect();
        if handles.is_empty() {
            return;
        }
        for handle in handles {
            if handle.join().is_err() {
                warn!("Worker thread exited with a panic");
            }
        }
        debug!("Worker pool shut down");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(id: usize, receiver: Arc<Mutex<mpsc::Receiver<Job>>>) {
    loop {
        // Hold the lock only while waiting, not while running the job
        let job = receiver.lock().recv();
        match job {
            Ok(job) => {
                if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                    warn!("Job on worker {} panicked", id);
                }
            }
            Err(_) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_runs_all_jobs() {
        let pool = WorkerPool::new(3).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::channel();

        for _ in 0..20 {
            let counter = Arc::clone(&counter);
            let tx = tx.clone();
            pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                tx.send(()).unwrap();
            })
            .unwrap();
        }
        drop(tx);

        assert_eq!(rx.iter().count(), 20);
        assert_eq!(counter.load(Ordering::SeqCst), 20);
    }

    #[test]
    fn test_submit_after_shutdown_fails() {
        let pool = WorkerPool::new(1).unwrap();
        pool.shutdown();
        let err = pool.submit(|| {}).unwrap_err();
        assert_eq!(err.error_code(), "WORKER_POOL_ERROR");
        pool.shutdown();
    }

    #[test]
    fn test_panicking_job_does_not_kill_worker() {
        let pool = WorkerPool::new(1).unwrap();
        let (tx, rx) = mpsc::channel();

        pool.submit(|| panic!("boom")).unwrap();
        pool.submit(move || tx.send(42).unwrap()).unwrap();

        assert_eq!(rx.recv().unwrap(), 42);
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(WorkerPool::new(0).is_err());
    }
}
