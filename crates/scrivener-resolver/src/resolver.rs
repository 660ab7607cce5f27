//! Worker pool with a shared call cap

use crate::config::ResolverConfig;
use scrivener_domain::{Oracle, OracleReply, OracleRequest};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex, Semaphore};
use tracing::{debug, warn};

/// Errors from batch resolution
#[derive(Debug, Error)]
pub enum ResolverError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The oracle call for one batch failed
    #[error("Oracle error: {0}")]
    Oracle(String),

    /// A worker task panicked or was cancelled
    #[error("Worker failure: {0}")]
    Worker(String),
}

/// Concurrent batch resolver
///
/// Fans a batch of independent oracle requests out over a fixed worker
/// pool. The oracle trait is blocking, so each call runs on the blocking
/// thread pool; a counting semaphore shared across workers caps how many
/// calls are in flight at once.
pub struct Resolver<O: Oracle> {
    oracle: Arc<O>,
    config: ResolverConfig,
}

impl<O> Resolver<O>
where
    O: Oracle + Send + Sync + 'static,
    O::Error: fmt::Display,
{
    /// Create a resolver; fails on invalid configuration
    pub fn new(oracle: O, config: ResolverConfig) -> Result<Self, ResolverError> {
        config.validate()?;
        Ok(Self {
            oracle: Arc::new(oracle),
            config,
        })
    }

    /// Resolve a batch of requests, one reply per request in input order
    ///
    /// Each request succeeds or fails independently; a failed call never
    /// affects the other batches.
    pub async fn resolve_batch(
        &self,
        requests: Vec<OracleRequest>,
    ) -> Vec<Result<OracleReply, ResolverError>> {
        let total = requests.len();
        if total == 0 {
            return Vec::new();
        }

        let (job_tx, job_rx) = mpsc::channel::<(usize, OracleRequest)>(total);
        let job_rx = Arc::new(Mutex::new(job_rx));
        let (result_tx, mut result_rx) =
            mpsc::channel::<(usize, Result<OracleReply, ResolverError>)>(total);
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_calls));

        for (idx, request) in requests.into_iter().enumerate() {
            // Channel capacity equals the batch size, so this never blocks.
            let _ = job_tx.send((idx, request)).await;
        }
        drop(job_tx);

        let workers = self.config.workers.min(total);
        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let job_rx = Arc::clone(&job_rx);
            let result_tx = result_tx.clone();
            let semaphore = Arc::clone(&semaphore);
            let oracle = Arc::clone(&self.oracle);

            handles.push(tokio::spawn(async move {
                loop {
                    let job = job_rx.lock().await.recv().await;
                    let Some((idx, request)) = job else { break };

                    let Ok(permit) = semaphore.acquire().await else {
                        break;
                    };
                    debug!(worker_id, batch = idx, "dispatching oracle call");
                    let oracle = Arc::clone(&oracle);
                    let outcome = tokio::task::spawn_blocking(move || {
                        oracle.propose(&request).map_err(|e| e.to_string())
                    })
                    .await;
                    drop(permit);

                    let result = match outcome {
                        Ok(Ok(reply)) => Ok(reply),
                        Ok(Err(message)) => {
                            warn!(batch = idx, error = %message, "oracle call failed");
                            Err(ResolverError::Oracle(message))
                        }
                        Err(e) => Err(ResolverError::Worker(e.to_string())),
                    };
                    if result_tx.send((idx, result)).await.is_err() {
                        break;
                    }
                }
            }));
        }
        drop(result_tx);

        let mut results: Vec<Option<Result<OracleReply, ResolverError>>> =
            (0..total).map(|_| None).collect();
        while let Some((idx, result)) = result_rx.recv().await {
            results[idx] = Some(result);
        }
        for handle in handles {
            let _ = handle.await;
        }

        results
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    Err(ResolverError::Worker("request was never answered".to_string()))
                })
            })
            .collect()
    }
}
