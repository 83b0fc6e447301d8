//! Worker pool for slash-command status requests.
//!
//! ```text
//! submit() ──try_send──► bounded mpsc ──► worker 0..N ──► StatusSource  
//!                                                │
//!                                                ▼
//!                                   ResponseSink (response_url)
//! ```
//!
//! Slack expects an answer to a slash command within three seconds, so the
//! handler only enqueues; the report is delivered later through the
//! command's `response_url`.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::error::{PoolError, PoolResult};
use super::StatusSource;
use crate::notify::{ResponseSink, SlashResponse};

/// A queued status request.
#[derive(Debug, Clone)]
pub struct StatusRequest {
    pub entity: String,
    pub response_url: String,
}

struct QueuedRequest {
    request: StatusRequest,
    queued_at: Instant,
}

type SharedReceiver = Arc<tokio::sync::Mutex<mpsc::Receiver<QueuedRequest>>>;

/// Fixed set of tokio tasks draining a bounded queue.
pub struct StatusPool {
    request_tx: Mutex<Option<mpsc::Sender<QueuedRequest>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    worker_count: usize,
    queue_capacity: usize,
    pending: Arc<AtomicUsize>,
    shutdown: AtomicBool,
}

impl StatusPool {
    /// Spawn `num_workers` workers. Must be called inside a tokio runtime.
    pub fn new(
        num_workers: usize,
        queue_capacity: usize,
        reporter: Arc<dyn StatusSource>,
        sink: Arc<dyn ResponseSink>,
    ) -> Self {
        let num_workers = num_workers.max(1);
        let queue_capacity = queue_capacity.max(1);

        let (request_tx, request_rx) = mpsc::channel::<QueuedRequest>(queue_capacity);
        let request_rx: SharedReceiver = Arc::new(tokio::sync::Mutex::new(request_rx));
        let pending = Arc::new(AtomicUsize::new(0));

        let workers = (0..num_workers)
            .map(|id| {
                tokio::spawn(worker_loop(
                    id,
                    Arc::clone(&request_rx),
                    Arc::clone(&reporter),
                    Arc::clone(&sink),
                    Arc::clone(&pending),
                ))
            })
            .collect();

        tracing::info!(
            workers = num_workers,
            capacity = queue_capacity,
            "status pool created"
        );

        Self {
            request_tx: Mutex::new(Some(request_tx)),
            workers: Mutex::new(workers),
            worker_count: num_workers,
            queue_capacity,
            pending,
            shutdown: AtomicBool::new(false),
        }
    }

    /// Queue a request. Fails fast when the queue is full or the pool is
    /// shut down.
    pub fn submit(&self, request: StatusRequest) -> PoolResult<()> {
        if self.shutdown.load(Ordering::SeqCst) {
            return Err(PoolError::Shutdown);
        }

        let tx = self
            .request_tx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(PoolError::Shutdown)?;

        self.pending.fetch_add(1, Ordering::SeqCst);
        let queued = QueuedRequest {
            request,
            queued_at: Instant::now(),
        };

        if let Err(e) = tx.try_send(queued) {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            return match e {
                mpsc::error::TrySendError::Full(_) => Err(PoolError::QueueFull {
                    capacity: self.queue_capacity,
                    pending: self.pending.load(Ordering::SeqCst),
                }),
                mpsc::error::TrySendError::Closed(_) => Err(PoolError::Shutdown),
            };
        }

        Ok(())
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Requests queued but not yet picked up.
    pub fn pending_count(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Stop accepting requests, let workers drain the queue, and wait for them.
    pub async fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.request_tx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();

        let workers: Vec<JoinHandle<()>> = self
            .workers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
            .collect();
        for worker in workers {
            let _ = worker.await;
        }
        tracing::info!("status pool stopped");
    }
}

async fn worker_loop(
    id: usize,
    rx: SharedReceiver,
    reporter: Arc<dyn StatusSource>,
    sink: Arc<dyn ResponseSink>,
    pending: Arc<AtomicUsize>,
) {
    tracing::debug!(worker = id, "status worker started");

    loop {
        let work = {
            let mut guard = rx.lock().await;
            guard.recv().await
        };

        let Some(QueuedRequest { request, queued_at }) = work else {
            // Channel closed, shutdown
            break;
        };
        pending.fetch_sub(1, Ordering::SeqCst);

        tracing::debug!(
            worker = id,
            app = %request.entity,
            wait_ms = queued_at.elapsed().as_millis() as u64,
            "building status report"
        );

        // A panicking report must not take the worker down with it.
        let reporter = Arc::clone(&reporter);
        let entity = request.entity.clone();
        let response = match tokio::spawn(async move { reporter.status_report(&entity).await }).await
        {
            Ok(text) => SlashResponse::in_channel(text),
            Err(e) => {
                tracing::error!(app = %request.entity, error = %e, "status report failed");
                SlashResponse::ephemeral(format!("❌ Failed: {}", e))
            }
        };

        sink.respond(&request.response_url, &response).await;
    }

    tracing::debug!(worker = id, "status worker stopped");
}
