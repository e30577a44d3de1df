use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for recorded calculations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuditId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CalculationKind {
    Limits,
    Solve,
    PurchasePrice,
    BorrowingPower,
}

impl CalculationKind {
    pub fn label(&self) -> &'static str {
        match self {
            CalculationKind::Limits => "limits",
            CalculationKind::Solve => "solve",
            CalculationKind::PurchasePrice => "purchase_price",
            CalculationKind::BorrowingPower => "borrowing_power",
        }
    }
}

/// Request/result pair handed to the audit store after a successful calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationAudit {
    pub audit_id: AuditId,
    pub profile_id: Option<String>,
    pub kind: CalculationKind,
    pub recorded_at: DateTime<Utc>,
    pub request: serde_json::Value,
    pub result: serde_json::Value,
}

/// Storage abstraction so the service can be exercised without a database.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: CalculationAudit) -> Result<(), AuditError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit store unavailable: {0}")]
    Unavailable(String),
}
