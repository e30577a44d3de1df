use metrics_exporter_prometheus::PrometheusHandle;
use mortgage_qualify::error::AppError;
use mortgage_qualify::qualification::{
    AuditError, AuditSink, CalculationAudit, LoanTermDefaults, QualificationService, ServiceError,
};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Entries kept by serve mode before the oldest are evicted.
pub(crate) const AUDIT_LOG_CAPACITY: usize = 1_000;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local calculation log holding the most recent entries only.
#[derive(Clone)]
pub(crate) struct InMemoryAuditLog {
    entries: Arc<Mutex<VecDeque<CalculationAudit>>>,
    capacity: usize,
}

impl Default for InMemoryAuditLog {
    fn default() -> Self {
        Self::with_capacity(AUDIT_LOG_CAPACITY)
    }
}

impl AuditSink for InMemoryAuditLog {
    fn record(&self, entry: CalculationAudit) -> Result<(), AuditError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| AuditError::Unavailable("audit log mutex poisoned".to_string()))?;
        while guard.len() >= self.capacity {
            if let Some(evicted) = guard.pop_front() {
                debug!(audit_id = %evicted.audit_id.0, "audit entry evicted");
            }
        }
        debug!(audit_id = %entry.audit_id.0, total = guard.len() + 1, "audit entry stored");
        guard.push_back(entry);
        Ok(())
    }
}

impl InMemoryAuditLog {
    /// A zero capacity is treated as one so the latest entry is always kept.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub(crate) fn entries(&self) -> Vec<CalculationAudit> {
        self.entries
            .lock()
            .map(|guard| guard.iter().cloned().collect())
            .unwrap_or_default()
    }
}

pub(crate) fn build_service(
    defaults: LoanTermDefaults,
) -> (Arc<QualificationService<InMemoryAuditLog>>, InMemoryAuditLog) {
    let audit = InMemoryAuditLog::default();
    let service = QualificationService::new(Arc::new(audit.clone()), defaults);
    (Arc::new(service), audit)
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value).map_err(ServiceError::from)?;
    println!("{rendered}");
    Ok(())
}
