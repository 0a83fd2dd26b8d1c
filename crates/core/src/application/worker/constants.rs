// Pipeline constants (no magic values)

/// Default number of concurrent pool workers
pub const DEFAULT_WORKERS: usize = 1;

/// Default capacity of the bounded job queue
pub const DEFAULT_QUEUE_SIZE: usize = 1;

/// Upper bound for the pool worker count
pub const MAX_WORKERS: usize = 1 << 20;

/// Upper bound for the job queue capacity (tokio channel permits are limited)
pub const MAX_QUEUE_SIZE: usize = 1 << 24;
