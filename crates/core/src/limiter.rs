//! Bounded concurrent execution
//!
//! A permit is taken before each task is spawned and held until the task
//! finishes, so at most `limit` tasks are ever in flight. Waiting items start
//! as earlier ones finish.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinError;

/// Run `task` over every item with at most `limit` running at once.
///
/// Results come back in item order once every task has finished. A task that
/// panics yields its [`JoinError`] instead of taking the others down.
pub async fn run_limited<T, F, Fut>(
    items: Vec<T>,
    limit: usize,
    task: F,
) -> Vec<Result<Fut::Output, JoinError>>
where
    F: Fn(T) -> Fut,
    Fut: Future + Send + 'static,
    Fut::Output: Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let mut handles = Vec::with_capacity(items.len());

    for item in items {
        let permit = semaphore.clone().acquire_owned().await;
        let future = task(item);

        handles.push(tokio::spawn(async move {
            let _permit = permit; // Hold permit until done
            future.await
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_never_exceeds_limit() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let results = run_limited((0..5).collect(), 2, |i: u64| {
            let in_flight = in_flight.clone();
            let max_seen = max_seen.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20 + (5 - i) * 5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                i * 10
            }
        })
        .await;

        assert_eq!(max_seen.load(Ordering::SeqCst), 2);
        let values: Vec<u64> = results.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(values, vec![0, 10, 20, 30, 40]);
    }

    #[tokio::test]
    async fn test_empty_input_completes_immediately() {
        let results = run_limited(Vec::<u8>::new(), 3, |i| async move { i }).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_panicking_task_does_not_block_others() {
        let results = run_limited(vec![1, 2, 3], 1, |i: i32| async move {
            if i == 2 {
                panic!("task {} failed", i);
            }
            i
        })
        .await;

        assert_eq!(results.len(), 3);
        assert_eq!(*results[0].as_ref().unwrap(), 1);
        assert!(results[1].is_err());
        assert_eq!(*results[2].as_ref().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_zero_limit_is_treated_as_one() {
        let max_seen = Arc::new(AtomicUsize::new(0));
        let in_flight = Arc::new(AtomicUsize::new(0));

        run_limited(vec![(); 3], 0, |_| {
            let in_flight = in_flight.clone();
            let max_seen = max_seen.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
            }
        })
        .await;

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }
}
