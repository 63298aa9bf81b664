//! Bounded task group used by the indexer, the loader and the writer.
//!
//! Items are handed to a pool of scoped threads. Results are appended to a
//! single accumulator under one lock; the first error is kept and stops
//! workers from starting new items while in-flight ones drain.

use crate::cancel::CancellationToken;
use crate::error::{Error, Result};
use log::debug;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;

fn worker_count(items: usize) -> usize {
    let parallelism = thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(4);
    items.min(parallelism).max(1)
}

/// Runs `task` for every item concurrently.
///
/// Results are returned in the order of `items`, whatever order the workers
/// finished in.
///
/// # Errors
/// * The first error returned by any task
/// * `Error::Cancelled` if the token stopped the group before every item ran
pub fn run_all<T, R, F>(items: &[T], cancel: &CancellationToken, task: F) -> Result<Vec<R>>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> Result<R> + Sync,
{
    cancel.check()?;
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let next = AtomicUsize::new(0);
    let failed = AtomicBool::new(false);
    let first_error: Mutex<Option<Error>> = Mutex::new(None);
    let results: Mutex<Vec<(usize, R)>> = Mutex::new(Vec::with_capacity(items.len()));

    thread::scope(|scope| {
        for _ in 0..worker_count(items.len()) {
            scope.spawn(|| loop {
                if failed.load(Ordering::SeqCst) || cancel.is_cancelled() {
                    break;
                }
                let index = next.fetch_add(1, Ordering::SeqCst);
                let Some(item) = items.get(index) else {
                    break;
                };

                match task(item) {
                    Ok(result) => {
                        if let Ok(mut results) = results.lock() {
                            results.push((index, result));
                        }
                    }
                    Err(err) => {
                        failed.store(true, Ordering::SeqCst);
                        if let Ok(mut first) = first_error.lock() {
                            if first.is_none() {
                                *first = Some(err);
                            } else {
                                debug!("Dropping subsequent task error: {err}");
                            }
                        }
                    }
                }
            });
        }
    });

    let first_error = first_error
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(err) = first_error {
        return Err(err);
    }

    let mut results = results
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if results.len() < items.len() {
        cancel.check()?;
    }
    results.sort_by_key(|(index, _)| *index);

    Ok(results.into_iter().map(|(_, result)| result).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_keep_input_order() {
        let items: Vec<u64> = (0..64).collect();
        let cancel = CancellationToken::new();
        let results = run_all(&items, &cancel, |n| Ok(n * 2)).unwrap();
        assert_eq!(results, items.iter().map(|n| n * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_input() {
        let items: Vec<u8> = Vec::new();
        let cancel = CancellationToken::new();
        let results = run_all(&items, &cancel, |n| Ok(*n)).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_first_error_is_returned() {
        let items: Vec<u32> = (0..16).collect();
        let result = run_all(&items, &CancellationToken::new(), |n| {
            if *n == 7 {
                Err(Error::ConfigError(format!("bad item {n}")))
            } else {
                Ok(*n)
            }
        });

        match result {
            Err(Error::ConfigError(message)) => assert_eq!(message, "bad item 7"),
            other => panic!("Expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel("stop");
        let items = vec![1, 2, 3];
        let ran = AtomicUsize::new(0);

        let result = run_all(&items, &token, |n| {
            ran.fetch_add(1, Ordering::SeqCst);
            Ok(*n)
        });

        assert!(matches!(result, Err(Error::Cancelled { .. })));
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cancel_mid_flight_stops_new_items() {
        let token = CancellationToken::new();
        let items: Vec<u32> = (0..1000).collect();

        let result = run_all(&items, &token, |n| {
            if *n == 0 {
                token.cancel("stop");
            }
            Ok(*n)
        });

        match result {
            Err(Error::Cancelled { reason }) => assert_eq!(reason, "stop"),
            // every item may legitimately have been claimed before the signal
            Ok(results) => assert_eq!(results.len(), items.len()),
            Err(other) => panic!("Expected Cancelled, got {other:?}"),
        }
    }
}
