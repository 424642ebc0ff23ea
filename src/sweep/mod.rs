pub mod coordinator;
pub mod report;
pub mod scheduler;

pub use coordinator::{
    MonitorCheck, SweepCoordinator, SweepError, SweepOptions, DEFAULT_NOTIFY_TIMEOUT,
    DEFAULT_SWEEP_CONCURRENCY,
};
pub use report::{MonitorFailure, SweepReport};
pub use scheduler::run_periodic_sweeps;
