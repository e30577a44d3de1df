use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::qualification::audit::{AuditError, AuditSink, CalculationAudit};
use crate::qualification::domain::{
    CompensatingFactorSelection, DtiRequest, FinancialProfile, LoanTerms,
};
use crate::qualification::product::LoanProgram;
use crate::qualification::service::{LoanTermDefaults, QualificationService};

pub(super) fn profile(
    annual_income: f64,
    monthly_debts: f64,
    fico: u16,
    ltv: f64,
) -> FinancialProfile {
    FinancialProfile {
        annual_income,
        monthly_debts,
        fico,
        ltv,
    }
}

pub(super) fn terms() -> LoanTerms {
    LoanTerms {
        property_tax_rate: 1.1,
        annual_insurance: 1_500.0,
        down_payment_percent: 20.0,
        pmi_rate: 0.55,
        interest_rate: 6.75,
        term_years: 30,
    }
}

pub(super) fn request(profile: FinancialProfile, program: LoanProgram) -> DtiRequest {
    DtiRequest {
        profile,
        factors: CompensatingFactorSelection::new(),
        program,
        terms: LoanTerms {
            down_payment_percent: 100.0 - profile.ltv,
            ..terms()
        },
        proposed_piti: None,
    }
}

/// The $120k conventional borrower used throughout the guideline examples.
pub(super) fn baseline_request() -> DtiRequest {
    request(profile(120_000.0, 500.0, 740, 80.0), LoanProgram::Conventional)
}

pub(super) fn strong_selection() -> CompensatingFactorSelection {
    CompensatingFactorSelection::new()
        .with("cashReserves", "6+ months")
        .with("residualIncome", "exceeds")
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

#[derive(Default, Clone)]
pub(super) struct MemoryAudit {
    entries: Arc<Mutex<Vec<CalculationAudit>>>,
}

impl MemoryAudit {
    pub(super) fn entries(&self) -> Vec<CalculationAudit> {
        self.entries.lock().expect("audit mutex poisoned").clone()
    }
}

impl AuditSink for MemoryAudit {
    fn record(&self, entry: CalculationAudit) -> Result<(), AuditError> {
        self.entries
            .lock()
            .expect("audit mutex poisoned")
            .push(entry);
        Ok(())
    }
}

pub(super) struct UnavailableAudit;

impl AuditSink for UnavailableAudit {
    fn record(&self, _entry: CalculationAudit) -> Result<(), AuditError> {
        Err(AuditError::Unavailable("audit database offline".to_string()))
    }
}

pub(super) fn build_service() -> (Arc<QualificationService<MemoryAudit>>, MemoryAudit) {
    let audit = MemoryAudit::default();
    let service = QualificationService::new(Arc::new(audit.clone()), LoanTermDefaults::default());
    (Arc::new(service), audit)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
