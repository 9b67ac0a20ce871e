use crate::domains::logger::DomainLogger;
use std::sync::Arc;

struct TracingBridge;

impl DomainLogger for TracingBridge {
    fn info(&self, msg: &str) {
        tracing::info!(target: "zoo_sim::domain", "{}", msg);
    }

    fn warn(&self, msg: &str) {
        tracing::warn!(target: "zoo_sim::domain", "{}", msg);
    }

    fn error(&self, msg: &str) {
        tracing::error!(target: "zoo_sim::domain", "{}", msg);
    }
}

/// DomainLogger that forwards into the process-wide `tracing` subscriber.
pub fn init_tracing_logger() -> Arc<dyn DomainLogger> {
    Arc::new(TracingBridge)
}
