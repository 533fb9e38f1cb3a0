//! Scoped fan-out helpers shared by the loader, the joins and the sweep.

use crate::config::Schedule;

/// Caps the requested worker count by the amount of available work.
pub(crate) fn effective_workers(requested: usize, tasks: usize) -> usize {
    requested.max(1).min(tasks.max(1))
}

/// Splits `items` into at most `workers` contiguous slices and maps each
/// slice on its own scoped thread.
///
/// Results come back in slice order, so concatenating them preserves the
/// input order. With one worker (or one item) `f` runs on the caller's thread.
pub(crate) fn scoped_map<T, R, F>(items: &[T], workers: usize, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&[T]) -> R + Sync,
{
    let workers = effective_workers(workers, items.len());
    if workers == 1 {
        return vec![f(items)];
    }

    let chunk_size = items.len().div_ceil(workers);
    let f = &f;
    std::thread::scope(|s| {
        let handles: Vec<_> = items
            .chunks(chunk_size)
            .map(|chunk| s.spawn(move || f(chunk)))
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect()
    })
}

/// Like [`scoped_map`], but each thread gets its slice mutably, together
/// with the index of the slice's first item in `items`.
pub(crate) fn scoped_map_mut<T, R, F>(items: &mut [T], workers: usize, f: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(usize, &mut [T]) -> R + Sync,
{
    let workers = effective_workers(workers, items.len());
    if workers == 1 {
        return vec![f(0, items)];
    }

    let chunk_size = items.len().div_ceil(workers);
    let f = &f;
    std::thread::scope(|s| {
        let handles: Vec<_> = items
            .chunks_mut(chunk_size)
            .enumerate()
            .map(|(n, chunk)| s.spawn(move || f(n * chunk_size, chunk)))
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect()
    })
}

/// Feeds every item to `step` on up to `workers` scoped threads.
///
/// Each worker folds its items into its own state, built by `init`, and
/// hands that state to `finish` once it runs out of items. With
/// [`Schedule::Static`] a worker owns one contiguous slice; with
/// [`Schedule::Dynamic`] workers pull items from a shared queue until it
/// drains. One worker (or one item) runs everything on the caller's thread.
pub(crate) fn scheduled_fold<T, S, I, F, D>(
    items: &[T],
    workers: usize,
    schedule: Schedule,
    init: I,
    step: F,
    finish: D,
) where
    T: Copy + Send + Sync,
    I: Fn() -> S + Sync,
    F: Fn(&mut S, T) + Sync,
    D: Fn(S) + Sync,
{
    let workers = effective_workers(workers, items.len());
    if workers == 1 {
        let mut state = init();
        for &item in items {
            step(&mut state, item);
        }
        finish(state);
        return;
    }

    let (init, step, finish) = (&init, &step, &finish);
    match schedule {
        Schedule::Static => {
            let chunk_size = items.len().div_ceil(workers);
            std::thread::scope(|s| {
                for chunk in items.chunks(chunk_size) {
                    s.spawn(move || {
                        let mut state = init();
                        for &item in chunk {
                            step(&mut state, item);
                        }
                        finish(state);
                    });
                }
            });
        }
        Schedule::Dynamic => {
            let (sender, receiver) = crossbeam_channel::unbounded::<T>();
            for &item in items {
                let _ = sender.send(item);
            }
            drop(sender);

            std::thread::scope(|s| {
                for _ in 0..workers {
                    let receiver = receiver.clone();
                    s.spawn(move || {
                        let mut state = init();
                        for item in receiver.iter() {
                            step(&mut state, item);
                        }
                        finish(state);
                    });
                }
            });
        }
    }
}
