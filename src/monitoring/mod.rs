pub mod prober;

pub use prober::{
    parse_target, HttpProber, LivenessProbe, ProbeResult, TargetError, DEFAULT_PROBE_TIMEOUT,
};
