/// Bounded parallel map with per-item fault isolation
///
/// Every task is attempted exactly once on a dedicated rayon pool of
/// `min(cpus, max_workers, tasks)` threads. Results come back in input
/// order. A failing (or panicking) task yields `Outcome::Failure` and
/// never stops its siblings. The pool runs on scoped threads, so every
/// worker thread has exited before `bounded_map` returns and the next
/// batch starts on a fresh pool.

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::progress::ProgressObserver;
use crate::error::Result;

/// Result of one item of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Human-readable failure detail
    Failure(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    /// Failure detail, if any
    pub fn error(&self) -> Option<&str> {
        match self {
            Outcome::Success => None,
            Outcome::Failure(msg) => Some(msg),
        }
    }
}

/// Number of workers for a batch of `items` tasks
pub fn pool_size(items: usize, max_workers: Option<usize>) -> usize {
    let cpus = num_cpus::get().max(1);
    let cap = max_workers.map_or(cpus, |max| max.clamp(1, cpus));
    cap.min(items)
}

/// Run `worker` on every task and collect outcomes in input order
///
/// An empty task list returns immediately without starting any threads.
pub fn bounded_map<T, F>(
    tasks: &[T],
    worker: F,
    max_workers: Option<usize>,
    observer: &dyn ProgressObserver,
) -> Result<Vec<Outcome>>
where
    T: Sync,
    F: Fn(&T) -> Outcome + Sync,
{
    if tasks.is_empty() {
        return Ok(Vec::new());
    }

    let total = tasks.len();
    let threads = pool_size(total, max_workers);
    tracing::debug!("running {} tasks on {} workers", total, threads);

    let completed = AtomicUsize::new(0);
    let outcomes = ThreadPoolBuilder::new().num_threads(threads).build_scoped(
        |thread| thread.run(),
        |pool| {
            pool.install(|| {
                tasks
                    .par_iter()
                    .map(|task| {
                        let outcome = run_isolated(&worker, task);
                        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                        observer.advance(done, total);
                        outcome
                    })
                    .collect::<Vec<_>>()
            })
        },
    )?;

    observer.finish();
    Ok(outcomes)
}

/// Call the worker, turning a panic into a failure outcome
fn run_isolated<T, F>(worker: &F, task: &T) -> Outcome
where
    F: Fn(&T) -> Outcome,
{
    match panic::catch_unwind(AssertUnwindSafe(|| worker(task))) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Outcome::Failure(format!("worker panicked: {}", detail))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::NoProgress;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;

    struct Recorder {
        seen: Mutex<Vec<(usize, usize)>>,
        finished: AtomicUsize,
    }

    impl ProgressObserver for Recorder {
        fn advance(&self, completed: usize, total: usize) {
            self.seen.lock().unwrap().push((completed, total));
        }

        fn finish(&self) {
            self.finished.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_empty_batch() {
        let tasks: Vec<u32> = Vec::new();
        let outcomes = bounded_map(&tasks, |_| Outcome::Success, None, &NoProgress).unwrap();
        assert!(outcomes.is_empty());
    }

    #[test]
    fn test_results_keep_input_order() {
        // Earlier tasks sleep longer so they finish last
        let tasks: Vec<u64> = (0..16).collect();
        let outcomes = bounded_map(
            &tasks,
            |&n| {
                thread::sleep(Duration::from_millis(16 - n));
                if n % 2 == 0 {
                    Outcome::Success
                } else {
                    Outcome::Failure(format!("odd {}", n))
                }
            },
            Some(4),
            &NoProgress,
        )
        .unwrap();

        assert_eq!(outcomes.len(), 16);
        for (n, outcome) in outcomes.iter().enumerate() {
            if n % 2 == 0 {
                assert!(outcome.is_success());
            } else {
                assert_eq!(outcome.error(), Some(format!("odd {}", n).as_str()));
            }
        }
    }

    #[test]
    fn test_panic_is_captured() {
        let tasks = vec![1, 2, 3];
        let outcomes = bounded_map(
            &tasks,
            |&n| {
                if n == 2 {
                    panic!("boom");
                }
                Outcome::Success
            },
            None,
            &NoProgress,
        )
        .unwrap();

        assert!(outcomes[0].is_success());
        assert_eq!(outcomes[1], Outcome::Failure("worker panicked: boom".to_string()));
        assert!(outcomes[2].is_success());
    }

    #[test]
    fn test_progress_reaches_total() {
        let tasks: Vec<u32> = (0..25).collect();
        let recorder = Recorder {
            seen: Mutex::new(Vec::new()),
            finished: AtomicUsize::new(0),
        };

        bounded_map(&tasks, |_| Outcome::Success, Some(3), &recorder).unwrap();

        let mut seen = recorder.seen.into_inner().unwrap();
        seen.sort();
        let expected: Vec<_> = (1..=25).map(|n| (n, 25)).collect();
        assert_eq!(seen, expected);
        assert_eq!(recorder.finished.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_pool_size_never_exceeds_items() {
        assert_eq!(pool_size(1, None), 1);
        assert_eq!(pool_size(0, None), 0);
        assert!(pool_size(10_000, None) <= num_cpus::get());
        assert_eq!(pool_size(10_000, Some(1)), 1);
        assert_eq!(pool_size(10_000, Some(0)), 1);
    }

    #[test]
    fn test_each_batch_gets_its_own_bounded_pool() {
        let tasks: Vec<u64> = (0..12).collect();
        let run_batch = || {
            let workers = Mutex::new(HashSet::new());
            bounded_map(
                &tasks,
                |_| {
                    workers.lock().unwrap().insert(thread::current().id());
                    thread::sleep(Duration::from_millis(2));
                    Outcome::Success
                },
                Some(3),
                &NoProgress,
            )
            .unwrap();
            workers.into_inner().unwrap()
        };

        let first = run_batch();
        let second = run_batch();

        assert!(!first.is_empty() && first.len() <= 3);
        assert!(!second.is_empty() && second.len() <= 3);
        assert!(!first.contains(&thread::current().id()));
        // Threads of the first pool are gone, none of them serve the second batch
        assert!(first.is_disjoint(&second));
    }
}
