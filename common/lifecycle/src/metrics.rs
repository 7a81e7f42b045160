use crate::controller::DrainOutcome;
use crate::phase::Phase;

pub(crate) const METRIC_SHUTDOWN_INITIATED: &str = "lifecycle_shutdown_initiated_total";
pub(crate) const METRIC_SHUTDOWN_COMPLETED: &str = "lifecycle_shutdown_completed_total";
pub(crate) const METRIC_DRAIN_DURATION: &str = "lifecycle_drain_duration_seconds";
pub(crate) const METRIC_PHASE: &str = "lifecycle_phase";

const ALL_PHASES: [Phase; 6] = [
    Phase::Init,
    Phase::Starting,
    Phase::Running,
    Phase::ShuttingDown,
    Phase::Stopped,
    Phase::Failed,
];

pub(crate) fn emit_shutdown_initiated(service_name: &str, trigger: &str) {
    metrics::counter!(
        METRIC_SHUTDOWN_INITIATED,
        "service_name" => service_name.to_string(),
        "trigger" => trigger.to_string()
    )
    .increment(1);
}

pub(crate) fn emit_shutdown_completed(service_name: &str, drain: DrainOutcome, duration_secs: f64) {
    metrics::counter!(
        METRIC_SHUTDOWN_COMPLETED,
        "service_name" => service_name.to_string(),
        "drain" => drain.as_str()
    )
    .increment(1);
    metrics::histogram!(
        METRIC_DRAIN_DURATION,
        "service_name" => service_name.to_string(),
        "drain" => drain.as_str()
    )
    .record(duration_secs);
}

/// One gauge series per phase, 1 for the current phase and 0 for the others.
pub(crate) fn emit_phase(service_name: &str, current: Phase) {
    for phase in ALL_PHASES {
        let value = if phase == current { 1.0 } else { 0.0 };
        metrics::gauge!(
            METRIC_PHASE,
            "service_name" => service_name.to_string(),
            "phase" => phase.as_str()
        )
        .set(value);
    }
}
