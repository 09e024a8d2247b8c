//! Fan-out/fan-in worker pool used to run the requests of one batch.

use std::collections::VecDeque;
use std::sync::Arc;

use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, trace};

/// One unit of work. Nothing runs until a worker claims and polls it.
pub type Task<T> = BoxFuture<'static, T>;

/// Result stream of a pool run. Ends once every worker has terminated.
pub type PoolResults<T> = ReceiverStream<T>;

/// Transient pool sized to its workload; a fresh one is used per batch.
pub struct WorkerPool;

impl WorkerPool {
    /// Spawn exactly `units.len()` workers. Each claims at most one unit,
    /// runs it and publishes the output. A worker that sees `cancellation`
    /// fired before claiming exits without a result; a claimed unit always
    /// runs to completion.
    ///
    /// Results are delivered in completion order, not submission order.
    pub fn run<T>(units: Vec<Task<T>>, cancellation: CancellationToken) -> PoolResults<T>
    where
        T: Send + 'static,
    {
        let workers = units.len();
        let (result_tx, result_rx) = mpsc::channel(workers.max(1));
        let queue = Arc::new(Mutex::new(VecDeque::from(units)));

        for worker in 0..workers {
            let queue = Arc::clone(&queue);
            let result_tx = result_tx.clone();
            let cancellation = cancellation.clone();

            tokio::spawn(async move {
                if cancellation.is_cancelled() {
                    trace!(worker, "Worker cancelled before claiming work");
                    return;
                }

                let Some(unit) = queue.lock().pop_front() else {
                    return;
                };

                let output = unit.await;
                // The collector may have stopped listening after cancellation
                if result_tx.send(output).await.is_err() {
                    trace!(worker, "Result dropped, collector gone");
                }
            }
            .in_current_span());
        }
        // Stream closes when the last worker drops its sender
        drop(result_tx);

        ReceiverStream::new(result_rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{FutureExt, StreamExt};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_every_unit_produces_one_result() {
        let units: Vec<Task<usize>> = (0..8).map(|i| async move { i * 2 }.boxed()).collect();

        let mut results: Vec<usize> = WorkerPool::run(units, CancellationToken::new())
            .collect()
            .await;
        results.sort();

        assert_eq!(results, vec![0, 2, 4, 6, 8, 10, 12, 14]);
    }

    #[tokio::test]
    async fn test_empty_workload_completes() {
        let results: Vec<()> = WorkerPool::run::<()>(Vec::new(), CancellationToken::new())
            .collect()
            .await;
        assert!(results.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_arrive_in_completion_order() {
        let units: Vec<Task<&'static str>> = vec![
            async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                "slow"
            }
            .boxed(),
            async { "fast" }.boxed(),
        ];

        let results: Vec<&str> = WorkerPool::run(units, CancellationToken::new())
            .collect()
            .await;

        assert_eq!(results, vec!["fast", "slow"]);
    }

    #[tokio::test]
    async fn test_cancelled_pool_runs_nothing() {
        let executed = Arc::new(AtomicUsize::new(0));
        let cancellation = CancellationToken::new();
        cancellation.cancel();

        let units: Vec<Task<()>> = (0..4)
            .map(|_| {
                let executed = Arc::clone(&executed);
                async move {
                    executed.fetch_add(1, Ordering::SeqCst);
                }
                .boxed()
            })
            .collect();

        let results: Vec<()> = WorkerPool::run(units, cancellation).collect().await;

        assert!(results.is_empty());
        assert_eq!(executed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_units_run_concurrently() {
        let barrier = Arc::new(tokio::sync::Barrier::new(3));
        let units: Vec<Task<()>> = (0..3)
            .map(|_| {
                let barrier = Arc::clone(&barrier);
                async move {
                    barrier.wait().await;
                }
                .boxed()
            })
            .collect();

        // Deadlocks unless all three units are in flight together
        let results: Vec<()> = tokio::time::timeout(
            Duration::from_secs(5),
            WorkerPool::run(units, CancellationToken::new()).collect(),
        )
        .await
        .expect("units should run concurrently");

        assert_eq!(results.len(), 3);
    }
}
