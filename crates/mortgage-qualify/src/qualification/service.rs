use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::audit::{AuditError, AuditId, AuditSink, CalculationAudit, CalculationKind};
use super::borrowing_power::{
    analyze_borrowing_power, AnalysisMode, BorrowingPowerOutcome, BorrowingPowerRequest,
};
use super::domain::{
    AllowedDti, CompensatingFactorSelection, DtiRequest, DtiResult, FinancialProfile, LoanTerms,
    PurchasePriceResult,
};
use super::error::QualificationError;
use super::product::LoanProgram;
use super::{resolve_limits, resolve_purchase_price, solve};

/// Market inputs used when a caller omits them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanTermDefaults {
    pub interest_rate: f64,
    pub term_years: u32,
    pub property_tax_rate: f64,
    pub annual_insurance: f64,
    pub pmi_rate: f64,
}

impl Default for LoanTermDefaults {
    fn default() -> Self {
        Self {
            interest_rate: 6.75,
            term_years: 30,
            property_tax_rate: 1.1,
            annual_insurance: 1_500.0,
            pmi_rate: 0.55,
        }
    }
}

/// Loan terms as submitted; missing fields fall back to configured defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanTermsInput {
    pub property_tax_rate: Option<f64>,
    pub annual_insurance: Option<f64>,
    pub down_payment_percent: Option<f64>,
    pub pmi_rate: Option<f64>,
    pub interest_rate: Option<f64>,
    pub term_years: Option<u32>,
}

impl LoanTermsInput {
    /// Down payment defaults to the complement of the profile LTV.
    pub fn resolve(&self, defaults: &LoanTermDefaults, ltv: f64) -> LoanTerms {
        LoanTerms {
            property_tax_rate: self.property_tax_rate.unwrap_or(defaults.property_tax_rate),
            annual_insurance: self.annual_insurance.unwrap_or(defaults.annual_insurance),
            down_payment_percent: self.down_payment_percent.unwrap_or(100.0 - ltv),
            pmi_rate: self.pmi_rate.unwrap_or(defaults.pmi_rate),
            interest_rate: self.interest_rate.unwrap_or(defaults.interest_rate),
            term_years: self.term_years.unwrap_or(defaults.term_years),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitsQuery {
    #[serde(default)]
    pub profile_id: Option<String>,
    pub fico: u16,
    pub ltv: f64,
    pub program: String,
    #[serde(default)]
    pub factors: CompensatingFactorSelection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualificationQuery {
    #[serde(default)]
    pub profile_id: Option<String>,
    pub profile: FinancialProfile,
    #[serde(default)]
    pub factors: CompensatingFactorSelection,
    pub program: String,
    #[serde(default)]
    pub terms: LoanTermsInput,
    #[serde(default, rename = "proposedPITI")]
    pub proposed_piti: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisModeInput {
    #[default]
    Single,
    Compare,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowingPowerQuery {
    #[serde(default)]
    pub profile_id: Option<String>,
    pub profile: FinancialProfile,
    #[serde(default)]
    pub factors: CompensatingFactorSelection,
    #[serde(default)]
    pub terms: LoanTermsInput,
    #[serde(default)]
    pub mode: AnalysisModeInput,
    #[serde(default)]
    pub program: Option<String>,
}

/// Calling-layer facade: resolves defaults, runs the engine, records audits.
pub struct QualificationService<S> {
    defaults: LoanTermDefaults,
    audit: Arc<S>,
    sequence: AtomicU64,
}

impl<S> QualificationService<S>
where
    S: AuditSink + 'static,
{
    pub fn new(audit: Arc<S>, defaults: LoanTermDefaults) -> Self {
        Self {
            defaults,
            audit,
            sequence: AtomicU64::new(1),
        }
    }

    pub fn defaults(&self) -> &LoanTermDefaults {
        &self.defaults
    }

    pub fn limits(&self, query: LimitsQuery) -> Result<AllowedDti, ServiceError> {
        let program = parse_program(&query.program)?;
        let allowed = resolve_limits(query.fico, query.ltv, program, &query.factors)
            .inspect_err(|err| warn!(%err, "limits request rejected"))?;
        self.record(
            CalculationKind::Limits,
            query.profile_id.clone(),
            &query,
            &allowed,
        )?;
        Ok(allowed)
    }

    pub fn solve(&self, query: QualificationQuery) -> Result<DtiResult, ServiceError> {
        let request = self.dti_request(&query)?;
        let result = solve(&request).inspect_err(|err| warn!(%err, "solve request rejected"))?;
        self.record(
            CalculationKind::Solve,
            query.profile_id.clone(),
            &request,
            &result,
        )?;
        Ok(result)
    }

    pub fn purchase_price(
        &self,
        query: QualificationQuery,
    ) -> Result<PurchasePriceResult, ServiceError> {
        let request = self.dti_request(&query)?;
        let result = resolve_purchase_price(&request)
            .inspect_err(|err| warn!(%err, "purchase price request rejected"))?;
        self.record(
            CalculationKind::PurchasePrice,
            query.profile_id.clone(),
            &request,
            &result,
        )?;
        Ok(result)
    }

    pub fn borrowing_power(
        &self,
        query: BorrowingPowerQuery,
    ) -> Result<BorrowingPowerOutcome, ServiceError> {
        let mode = match query.mode {
            AnalysisModeInput::Compare => AnalysisMode::Compare,
            AnalysisModeInput::Single => {
                let raw = query.program.as_deref().ok_or_else(|| {
                    QualificationError::invalid(
                        "program",
                        "required for single-program analysis",
                    )
                })?;
                AnalysisMode::Single {
                    program: parse_program(raw)?,
                }
            }
        };

        let request = BorrowingPowerRequest {
            profile: query.profile,
            factors: query.factors.clone(),
            terms: query.terms.resolve(&self.defaults, query.profile.ltv),
            mode,
        };
        let outcome = analyze_borrowing_power(&request)
            .inspect_err(|err| warn!(%err, "borrowing power request rejected"))?;
        self.record(
            CalculationKind::BorrowingPower,
            query.profile_id.clone(),
            &request,
            &outcome,
        )?;
        Ok(outcome)
    }

    fn dti_request(&self, query: &QualificationQuery) -> Result<DtiRequest, ServiceError> {
        Ok(DtiRequest {
            profile: query.profile,
            factors: query.factors.clone(),
            program: parse_program(&query.program)?,
            terms: query.terms.resolve(&self.defaults, query.profile.ltv),
            proposed_piti: query.proposed_piti,
        })
    }

    fn record<Req, Res>(
        &self,
        kind: CalculationKind,
        profile_id: Option<String>,
        request: &Req,
        result: &Res,
    ) -> Result<AuditId, ServiceError>
    where
        Req: Serialize,
        Res: Serialize,
    {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let audit_id = AuditId(format!("calc-{sequence:06}"));
        let entry = CalculationAudit {
            audit_id: audit_id.clone(),
            profile_id,
            kind,
            recorded_at: Utc::now(),
            request: serde_json::to_value(request)?,
            result: serde_json::to_value(result)?,
        };

        self.audit.record(entry)?;
        debug!(audit_id = %audit_id.0, kind = kind.label(), "calculation recorded");
        Ok(audit_id)
    }
}

fn parse_program(raw: &str) -> Result<LoanProgram, ServiceError> {
    raw.parse::<LoanProgram>().map_err(|err| {
        warn!(%err, "unsupported loan program requested");
        ServiceError::from(err)
    })
}

/// Error raised by the qualification service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Qualification(#[from] QualificationError),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("failed to encode audit payload: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Qualification(QualificationError::InvalidInput { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ServiceError::Qualification(QualificationError::UnsupportedProduct(_)) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::Audit(_) | ServiceError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
