/// Default extension of per-item parameter sidecar files
pub const DEFAULT_PARAMS_EXTENSION: &str = "params";
/// Worker count used when the machine's parallelism cannot be determined
pub const FALLBACK_WORKER_COUNT: usize = 4;
/// Upper bound on worker threads
pub const MAX_WORKERS: usize = 256;
