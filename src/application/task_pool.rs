// Bounded worker pool shared by the selection and enrichment phases
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub const DEFAULT_MAX_WORKERS: usize = 4;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("worker batch did not complete within {0:?}")]
    Timeout(Duration),

    #[error("worker task failed to complete: {0}")]
    Join(String),

    #[error("worker pool was closed")]
    Closed,
}

/// Runs batches of tasks with at most `max_workers` in flight.
///
/// A batch either yields every result, in submission order, or the first
/// error observed. Outstanding tasks are aborted once a batch fails or its
/// wait timeout elapses.
#[derive(Debug, Clone, Copy)]
pub struct TaskPool {
    max_workers: usize,
    wait_timeout: Option<Duration>,
}

impl Default for TaskPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WORKERS)
    }
}

impl TaskPool {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
            wait_timeout: None,
        }
    }

    pub fn with_wait_timeout(mut self, wait_timeout: Duration) -> Self {
        self.wait_timeout = Some(wait_timeout);
        self
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub async fn run_all<I, F, Fut, T, E>(&self, inputs: I, task: F) -> Result<Vec<T>, E>
    where
        I: IntoIterator,
        F: Fn(I::Item) -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: From<PoolError> + Send + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut join_set = JoinSet::new();

        for (index, input) in inputs.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let work = task(input);
            join_set.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| E::from(PoolError::Closed))?;
                work.await.map(|value| (index, value))
            });
        }

        let collect = async {
            let mut results = Vec::with_capacity(join_set.len());
            while let Some(joined) = join_set.join_next().await {
                match joined {
                    Ok(outcome) => results.push(outcome?),
                    Err(err) => return Err(E::from(PoolError::Join(err.to_string()))),
                }
            }
            Ok(results)
        };

        let mut results = match self.wait_timeout {
            Some(limit) => tokio::time::timeout(limit, collect)
                .await
                .map_err(|_| E::from(PoolError::Timeout(limit)))??,
            None => collect.await?,
        };

        results.sort_by_key(|(index, _)| *index);
        Ok(results.into_iter().map(|(_, value)| value).collect())
    }
}
