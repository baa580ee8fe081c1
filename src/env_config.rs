//! Shared environment configuration for the server and CLI binaries.
//!
//! Consolidates the `RAYON_NUM_THREADS` and `LINEUP_PORT` reads so every
//! binary resolves them the same way.

/// Read `RAYON_NUM_THREADS` (fallback `OMP_NUM_THREADS`, default: available
/// hardware parallelism) and build the global rayon pool. Tolerates an
/// already-initialized pool. Returns the thread count.
pub fn init_rayon_threads_lenient() -> usize {
    let num_threads = std::env::var("RAYON_NUM_THREADS")
        .or_else(|_| std::env::var("OMP_NUM_THREADS"))
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(8)
        });
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .ok(); // May fail if already initialized
    eprintln!("Rayon threads: {}", num_threads);
    num_threads
}

/// Read `LINEUP_PORT` (default 9000).
pub fn server_port() -> u16 {
    std::env::var("LINEUP_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(9000)
}
