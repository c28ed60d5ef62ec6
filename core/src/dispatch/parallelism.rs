/// Worker and in-flight bounds for one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelismProfile {
    pub worker_count: usize,
    /// Capacity of the job and result channels.
    pub inflight_jobs: usize,
}

impl ParallelismProfile {
    pub fn single_threaded() -> Self {
        Self {
            worker_count: 1,
            inflight_jobs: 1,
        }
    }

    /// `threads` workers (at least one) with two jobs in flight per worker.
    pub fn with_threads(threads: usize) -> Self {
        let worker_count = threads.max(1);
        Self {
            worker_count,
            inflight_jobs: worker_count * 2,
        }
    }

    /// One worker per hardware thread.
    pub fn auto() -> Self {
        Self::with_threads(num_cpus::get())
    }

    /// Bound in-flight jobs by a fraction of available memory.
    pub fn dynamic(block_size: usize, mem_fraction: f64, hard_cap: usize) -> Self {
        let cores = num_cpus::get();
        let worker_count = cores.saturating_sub(1).max(1); // leave one core free

        let mut sys = sysinfo::System::new();
        sys.refresh_memory();
        let avail_bytes = sys.available_memory();

        let budget = (avail_bytes as f64 * mem_fraction.clamp(0.0, 1.0)) as u64;
        let max_jobs = budget / block_size.max(1) as u64;

        Self {
            worker_count,
            inflight_jobs: (max_jobs.min(hard_cap as u64) as usize).max(1),
        }
    }

    pub fn is_sequential(&self) -> bool {
        self.worker_count <= 1
    }
}
