//! # Concurrency Tests using Loom
//!
//! This module uses loom to model the two pieces of shared mutable state in
//! the engine: the worker pool's shared task queue and the aggregating
//! runner's teardown-error list.

#[cfg(test)]
mod tests {
    use loom::sync::atomic::{AtomicUsize, Ordering};
    use loom::sync::{Arc, Mutex};
    use loom::thread;

    /// Models the worker pool's queue discipline: several workers pop from
    /// one shared queue until it drains.
    ///
    /// The real pool stores each output into a per-task slot; here it is
    /// enough to verify that under every interleaving each task is claimed
    /// by exactly one worker and none is lost.
    #[test]
    fn test_shared_queue_dispatches_each_task_exactly_once() {
        loom::model(|| {
            const TASKS: usize = 3;
            const WORKERS: usize = 2;

            let queue = Arc::new(Mutex::new((0..TASKS).collect::<Vec<usize>>()));
            let executed: Arc<Vec<AtomicUsize>> =
                Arc::new((0..TASKS).map(|_| AtomicUsize::new(0)).collect());

            let mut handles = vec![];
            for _worker in 0..WORKERS {
                let queue = queue.clone();
                let executed = executed.clone();
                handles.push(thread::spawn(move || loop {
                    let next = queue.lock().unwrap().pop();
                    match next {
                        Some(index) => {
                            executed[index].fetch_add(1, Ordering::SeqCst);
                        }
                        None => break,
                    }
                }));
            }

            for handle in handles {
                handle.join().unwrap();
            }

            for slot in executed.iter() {
                assert_eq!(slot.load(Ordering::SeqCst), 1);
            }
        });
    }

    /// Models parallel dispose-after-run cleanup appending to the shared
    /// teardown-error list from several workers at once: every recorded
    /// error must survive, whatever the interleaving.
    #[test]
    fn test_teardown_error_appends_are_never_lost() {
        loom::model(|| {
            const WORKERS: usize = 2;

            let errors = Arc::new(Mutex::new(Vec::new()));

            let mut handles = vec![];
            for worker in 0..WORKERS {
                let errors = errors.clone();
                handles.push(thread::spawn(move || {
                    errors.lock().unwrap().push(worker);
                }));
            }

            for handle in handles {
                handle.join().unwrap();
            }

            let recorded = errors.lock().unwrap();
            assert_eq!(recorded.len(), WORKERS);
            for worker in 0..WORKERS {
                assert!(recorded.contains(&worker));
            }
        });
    }
}
