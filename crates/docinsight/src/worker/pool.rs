use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use log::{debug, error, info, warn};
use tokio::sync::broadcast;

use crate::error::WorkerError;
use crate::pipeline::progress::{
    BroadcastProgress, DocumentProgressEvent, NoopProgress, ProcessingPhase, ProgressEvent,
    ProgressReporter,
};
use crate::pipeline::{Pipeline, PipelineConfig};
use crate::worker::job::{Job, JobResult};

/// Builds the pipeline each worker thread owns.
pub type PipelineFactory = Arc<dyn Fn() -> Pipeline + Send + Sync>;

type InFlight = Arc<Mutex<HashSet<String>>>;

pub struct WorkerPool {
    job_sender: Sender<Job>,
    result_receiver: Receiver<JobResult>,
    workers: Vec<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    in_flight: InFlight,
}

impl WorkerPool {
    pub fn new(config: Arc<PipelineConfig>, worker_count: usize) -> Result<Self, WorkerError> {
        let factory: PipelineFactory = Arc::new(move || Pipeline::from_config(&config));
        Self::with_factory(factory, worker_count, None)
    }

    /// Creates a pool whose workers build their pipeline with `factory` and
    /// optionally publish progress on `progress_sender`.
    pub fn with_factory(
        factory: PipelineFactory,
        worker_count: usize,
        progress_sender: Option<Arc<broadcast::Sender<DocumentProgressEvent>>>,
    ) -> Result<Self, WorkerError> {
        if worker_count == 0 {
            return Err(WorkerError::SpawnFailed(
                "worker_count must be > 0".to_string(),
            ));
        }

        // Results are unbounded so a caller may submit a whole batch before draining.
        let (job_sender, job_receiver) = bounded::<Job>(worker_count * 2);
        let (result_sender, result_receiver) = unbounded::<JobResult>();
        let shutdown = Arc::new(AtomicBool::new(false));
        let in_flight: InFlight = Arc::new(Mutex::new(HashSet::new()));

        let mut workers = Vec::with_capacity(worker_count);

        for worker_id in 0..worker_count {
            let worker = Worker {
                id: worker_id,
                job_receiver: job_receiver.clone(),
                result_sender: result_sender.clone(),
                shutdown: Arc::clone(&shutdown),
                in_flight: Arc::clone(&in_flight),
                progress_sender: progress_sender.clone(),
            };
            let worker_factory = Arc::clone(&factory);

            let handle = thread::Builder::new()
                .name(format!("docinsight-worker-{}", worker_id))
                .spawn(move || worker.run(worker_factory()))
                .map_err(|e| WorkerError::SpawnFailed(e.to_string()))?;

            workers.push(handle);
        }

        info!("Started {} workers", worker_count);

        Ok(Self {
            job_sender,
            result_receiver,
            workers,
            shutdown,
            in_flight,
        })
    }

    /// Queues a job. A document that is already queued or running is rejected.
    pub fn submit(&self, job: Job) -> Result<(), WorkerError> {
        if self.shutdown.load(Ordering::Relaxed) {
            return Err(WorkerError::ChannelClosed);
        }

        let document_id = job.document_id.clone();
        if !lock(&self.in_flight).insert(document_id.clone()) {
            return Err(WorkerError::AlreadyRunning(document_id));
        }

        self.job_sender.send(job).map_err(|_| {
            lock(&self.in_flight).remove(&document_id);
            WorkerError::ChannelClosed
        })
    }

    pub fn is_running(&self, document_id: &str) -> bool {
        lock(&self.in_flight).contains(document_id)
    }

    pub fn try_recv_result(&self) -> Option<JobResult> {
        self.result_receiver.try_recv().ok()
    }

    pub fn recv_result(&self) -> Option<JobResult> {
        self.result_receiver.recv().ok()
    }

    pub fn shutdown(&self) {
        info!("Shutting down worker pool...");
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn wait(self) {
        // Dropping the sender lets idle workers exit.
        drop(self.job_sender);

        for (i, worker) in self.workers.into_iter().enumerate() {
            if let Err(e) = worker.join() {
                error!("Worker {} panicked: {:?}", i, e);
            } else {
                debug!("Worker {} finished", i);
            }
        }

        info!("All workers have stopped");
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

fn lock(set: &Mutex<HashSet<String>>) -> MutexGuard<'_, HashSet<String>> {
    set.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Clears a document id from the in-flight set when dropped, including
/// during a panic unwind out of the pipeline.
struct InFlightGuard<'a> {
    in_flight: &'a Mutex<HashSet<String>>,
    document_id: &'a str,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        lock(self.in_flight).remove(self.document_id);
    }
}

struct Worker {
    id: usize,
    job_receiver: Receiver<Job>,
    result_sender: Sender<JobResult>,
    shutdown: Arc<AtomicBool>,
    in_flight: InFlight,
    progress_sender: Option<Arc<broadcast::Sender<DocumentProgressEvent>>>,
}

impl Worker {
    fn run(self, pipeline: Pipeline) {
        debug!("Worker {} started", self.id);

        loop {
            if self.shutdown.load(Ordering::Relaxed) {
                debug!("Worker {} received shutdown signal", self.id);
                break;
            }

            match self
                .job_receiver
                .recv_timeout(std::time::Duration::from_millis(100))
            {
                Ok(job) => {
                    debug!("Worker {} processing document {}", self.id, job.document_id);
                    let guard = InFlightGuard {
                        in_flight: &self.in_flight,
                        document_id: &job.document_id,
                    };

                    let record = match self.progress_sender {
                        Some(ref sender) => {
                            let filename = job
                                .source_path
                                .file_name()
                                .map(|n| n.to_string_lossy().to_string())
                                .unwrap_or_else(|| "unknown".to_string());
                            let progress =
                                BroadcastProgress::new(&job.document_id, &filename, Arc::clone(sender));
                            progress.report(ProgressEvent::Phase {
                                phase: ProcessingPhase::Queued,
                                message: "Document queued for processing".to_string(),
                            });
                            pipeline.run(&job.source_path, job.content_category, &progress)
                        }
                        None => pipeline.run(&job.source_path, job.content_category, &NoopProgress),
                    };

                    drop(guard);

                    let result = JobResult {
                        document_id: job.document_id,
                        record,
                    };
                    if let Err(e) = self.result_sender.send(result) {
                        error!("Worker {} failed to send result: {}", self.id, e);
                        break;
                    }
                }
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                    continue;
                }
                Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                    debug!("Worker {} job channel disconnected", self.id);
                    break;
                }
            }
        }

        if self.shutdown.load(Ordering::Relaxed) {
            self.discard_queued();
        }

        debug!("Worker {} stopped", self.id);
    }

    fn discard_queued(&self) {
        for job in self.job_receiver.try_iter() {
            warn!("Worker {} dropping queued document {}", self.id, job.document_id);
            lock(&self.in_flight).remove(&job.document_id);
        }
    }
}
