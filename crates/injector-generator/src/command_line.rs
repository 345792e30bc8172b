//! Check command lines.
//!
//! The first injected command checks hosts and cycles through a fixed
//! up/down sequence. Every other command checks services: it cycles through
//! a fixed ok/warning/critical/unknown sequence and emits a random number of
//! metrics with values in a random range.

use crate::numeric::{draw_count, metric_value_range};
use injector_core::Cardinality;
use rand::Rng;

/// Executable every generated command line starts with.
pub const DEFAULT_BASE: &str = "echo ok";

/// Status sequence replayed by host checks.
pub const HOST_STATUS_SEQUENCE: &str =
    "up,up,up,up,up,up,down,up,up,up,up,up,up,up,up,up,up,down,down,down";

/// Status sequence replayed by service checks.
pub const SERVICE_STATUS_SEQUENCE: &str = "ok,ok,ok,ok,ok,critical,warning,ok,ok,critical,\
critical,critical,ok,ok,ok,ok,ok,ok,ok,ok,ok,ok,ok,ok,ok,ok,ok,ok,ok,ok,unknown,unknown,unknown";

/// Command line of the host-check command.
pub fn host_check(base: &str) -> String {
    format!("{base} --host --status-sequence \"{HOST_STATUS_SEQUENCE}\"")
}

/// Command line of a service-check command with random metrics.
pub fn service_check<R: Rng>(rng: &mut R, base: &str, metrics: Cardinality) -> String {
    let metrics_count = draw_count(rng, metrics);
    let (low, high) = metric_value_range(rng);
    format!(
        "{base} --status-sequence \"{SERVICE_STATUS_SEQUENCE}\" \
         --metrics-count {metrics_count} --metrics-name \"metric\" \
         --metrics-values-range \"{low}:{high}\""
    )
}

/// Service macros overriding the metric count and value range of a check.
pub const METRIC_COUNT_MACRO: &str = "$_SERVICEMETRICCOUNT$";
pub const METRIC_MIN_RANGE_MACRO: &str = "$_SERVICEMETRICMINRANGE$";
pub const METRIC_MAX_RANGE_MACRO: &str = "$_SERVICEMETRICMAXRANGE$";

/// Random values for the three metric macros, as `(name, value)` pairs.
pub fn metric_macros<R: Rng>(rng: &mut R, metrics: Cardinality) -> [(&'static str, i64); 3] {
    let count = draw_count(rng, metrics);
    let (low, high) = metric_value_range(rng);
    [
        (METRIC_COUNT_MACRO, i64::try_from(count).unwrap_or(i64::MAX)),
        (METRIC_MIN_RANGE_MACRO, low),
        (METRIC_MAX_RANGE_MACRO, high),
    ]
}
