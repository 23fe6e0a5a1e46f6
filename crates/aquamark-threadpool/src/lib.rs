//! Execution-strategy abstraction for the per-block loops of the watermark
//! codec. A [`WorkerPool`] maps a pure function over a task list and returns
//! results in input order, so the caller indexes them by block linear index
//! no matter which strategy ran the tasks.
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Requested execution strategy.
///
/// `Process` is accepted for compatibility with the original tool's pool
/// surface; fork-based worker pools are not supported and it degrades to
/// `Threaded` with a warning. `Vectorized` is reserved for batched-array
/// implementations and currently runs serially.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoolMode {
    #[default]
    Serial,
    Threaded,
    Process,
    Vectorized,
}

#[derive(Debug, Clone)]
pub struct WorkerPool(WorkerPoolImpl);

#[derive(Debug, Clone)]
enum WorkerPoolImpl {
    #[cfg(feature = "rayon")]
    Rayon(std::sync::Arc<rayon_core::ThreadPool>),
    Serial,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::with_mode(PoolMode::Serial, None)
    }
}

impl WorkerPool {
    pub const fn serial() -> Self {
        Self(WorkerPoolImpl::Serial)
    }

    /// Build a pool for the requested mode, resolving the degraded modes.
    pub fn with_mode(mode: PoolMode, workers: Option<usize>) -> Self {
        match mode {
            PoolMode::Serial => Self::serial(),
            PoolMode::Vectorized => {
                tracing::debug!("Vectorized mode is reserved; running serially");
                Self::serial()
            }
            PoolMode::Process => {
                tracing::warn!(
                    "Process pools are not supported on this platform; degrading to threaded"
                );
                Self::threaded(workers)
            }
            PoolMode::Threaded => Self::threaded(workers),
        }
    }

    #[cfg(feature = "rayon")]
    fn threaded(workers: Option<usize>) -> Self {
        let num_threads = match workers {
            Some(n) => n,
            None => match std::thread::available_parallelism() {
                Ok(n) => n.into(),
                Err(e) => {
                    tracing::warn!(%e, "Failed to query available parallelism; falling back to serial");
                    return Self::serial();
                }
            },
        };

        let pool = rayon_core::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build();
        match pool {
            Ok(pool) => {
                tracing::debug!(num_threads, "Initialized worker thread pool");
                Self(WorkerPoolImpl::Rayon(std::sync::Arc::new(pool)))
            }
            Err(e) => {
                tracing::warn!(%e, "Failed to initialize thread pool; falling back to serial");
                Self::serial()
            }
        }
    }

    #[cfg(not(feature = "rayon"))]
    fn threaded(_workers: Option<usize>) -> Self {
        tracing::warn!("Not built with multithread support; running serially");
        Self::serial()
    }

    pub fn is_multithreaded(&self) -> bool {
        match self.0 {
            #[cfg(feature = "rayon")]
            WorkerPoolImpl::Rayon(_) => true,
            WorkerPoolImpl::Serial => false,
        }
    }

    /// Apply `op` to every task, returning results in input order.
    pub fn map<T, R, F>(&self, tasks: Vec<T>, op: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Send + Sync,
    {
        match &self.0 {
            #[cfg(feature = "rayon")]
            WorkerPoolImpl::Rayon(pool) => {
                pool.install(|| tasks.into_par_iter().map(op).collect())
            }
            WorkerPoolImpl::Serial => tasks.into_iter().map(op).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_map_preserves_order() {
        let pool = WorkerPool::serial();
        let out = pool.map((0..100).collect(), |v: i32| v * 3);
        assert_eq!(out, (0..100).map(|v| v * 3).collect::<Vec<_>>());
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn threaded_map_matches_serial() {
        let serial = WorkerPool::serial();
        let threaded = WorkerPool::with_mode(PoolMode::Threaded, Some(4));
        assert!(threaded.is_multithreaded());
        let expected = serial.map((0..1000).collect(), |v: u64| v.wrapping_mul(v) ^ 0xa5);
        let actual = threaded.map((0..1000).collect(), |v: u64| v.wrapping_mul(v) ^ 0xa5);
        assert_eq!(expected, actual);
    }

    #[test]
    fn process_mode_degrades() {
        // must resolve to a working pool either way
        let pool = WorkerPool::with_mode(PoolMode::Process, Some(2));
        let out = pool.map(vec![1, 2, 3], |v: i32| v + 1);
        assert_eq!(out, vec![2, 3, 4]);
    }
}
