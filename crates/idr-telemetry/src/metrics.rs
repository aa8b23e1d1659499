//! Prometheus metrics for registry activity.
//!
//! All metrics follow the naming convention: `idr_<component>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Opts, Registry, TextEncoder};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Accepted operations by kind and authorization path
    pub static ref REGISTRY_OPERATIONS: CounterVec = CounterVec::new(
        Opts::new("idr_registry_operations_total", "Accepted registry operations"),
        &["operation", "authorization"]  // authorization: direct/signed/program
    ).expect("metric creation failed");

    /// Rejected operations by kind and reason
    pub static ref REGISTRY_REJECTIONS: CounterVec = CounterVec::new(
        Opts::new("idr_registry_rejections_total", "Rejected registry operations"),
        &["operation", "reason"]  // reason: bad_actor/bad_signature/ledger
    ).expect("metric creation failed");

    /// Nonces consumed by signed operations
    pub static ref NONCES_CONSUMED: Counter = Counter::new(
        "idr_registry_nonces_consumed_total",
        "Controller nonces consumed by signed operations"
    ).expect("metric creation failed");
}

/// Handle to the registry the metrics live in.
#[derive(Clone)]
pub struct MetricsHandle {
    registry: Arc<Registry>,
}

impl MetricsHandle {
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; already registered collectors are skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(REGISTRY_OPERATIONS.clone()),
        Box::new(REGISTRY_REJECTIONS.clone()),
        Box::new(NONCES_CONSUMED.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
