//! Core-budget split between file-level workers and encoder threads.
//!
//! One external encoder runs per worker, and the encoder gets its own thread
//! hint, so the budget is `workers * encoder_threads <= available cores`.
//! Splitting wide (many workers, few encoder threads) wins for batches of
//! small images; the reserved margin keeps the OS responsive.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadPlan {
    /// Files processed concurrently (rayon pool size).
    pub workers: usize,
    /// Thread hint passed to each encoder invocation.
    pub encoder_threads: usize,
}

/// Plan for image batches. `requested` overrides the worker count;
/// encoder threads are rebalanced around it.
pub fn plan_image_workers(requested: Option<usize>) -> ThreadPlan {
    plan_for_cores(num_cpus::get(), requested)
}

fn plan_for_cores(cores: usize, requested: Option<usize>) -> ThreadPlan {
    let cores = cores.max(1);
    // Reserve 20% of cores (1..=2) for the OS and the progress thread.
    let reserved = cores.div_ceil(5).clamp(1, 2);
    let available = cores.saturating_sub(reserved).max(1);

    match requested {
        Some(n) => {
            let workers = n.max(1);
            let encoder_threads = (available / workers).clamp(1, 8);
            ThreadPlan {
                workers,
                encoder_threads,
            }
        }
        None => {
            let encoder_threads = available.min(2);
            let workers = (available / encoder_threads).clamp(1, 8);
            ThreadPlan {
                workers,
                encoder_threads,
            }
        }
    }
}
