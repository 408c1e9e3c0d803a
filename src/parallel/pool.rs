//! Rayon thread pool sizing for batch shot simulation.

use rayon::ThreadPoolBuilder;

/// How many worker threads batch runs use. `0` means the global Rayon pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerPool {
    pub workers: usize,
}

impl WorkerPool {
    pub fn with_workers(workers: usize) -> Self {
        Self { workers }
    }

    /// Reads `ORDNANCE_WORKERS`; unset or unparseable means the global pool.
    pub fn from_env() -> Self {
        let workers = std::env::var("ORDNANCE_WORKERS")
            .ok()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0);
        Self { workers }
    }

    /// Threads `install` will actually run on.
    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            rayon::current_num_threads()
        } else {
            self.workers
        }
    }

    /// Runs `f` on a pool of this size. Falls back to the global pool if a
    /// dedicated one cannot be built.
    pub fn install<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        if self.workers == 0 {
            return f();
        }
        match ThreadPoolBuilder::new().num_threads(self.workers).build() {
            Ok(pool) => pool.install(f),
            Err(err) => {
                tracing::warn!(workers = self.workers, error = %err, "falling back to global rayon pool");
                f()
            }
        }
    }
}
