//! DTI qualification engine for FHA and Conventional programs.
//!
//! Everything below `service` and `router` is pure: each entry point
//! validates its inputs, then runs factors → limits → payment → price
//! without touching shared state.

pub mod audit;
pub mod borrowing_power;
pub mod domain;
mod error;
pub mod factors;
pub mod limits;
pub mod product;
pub mod purchase;
pub mod router;
pub mod service;
pub mod solver;

#[cfg(test)]
mod tests;

pub use audit::{AuditError, AuditId, AuditSink, CalculationAudit, CalculationKind};
pub use borrowing_power::{
    analyze_borrowing_power, AffordabilityMetrics, AnalysisMode, BorrowingPowerOutcome,
    BorrowingPowerRequest, BorrowingPowerResult, PaymentBreakdown, ProgramComparison,
    ProgramPreset, Recommendation, RecommendationKind,
};
pub use domain::{
    ActualDti, AllowedDti, CalculationDetails, CompensatingFactorSelection, DtiFlag, DtiRequest,
    DtiResult, FinancialProfile, LoanTerms, PurchasePriceResult,
};
pub use error::{QualificationError, QualificationResult};
pub use factors::{count_strong_factors, EnhancedFactorSet, FactorKey, FactorLevel};
pub use product::{LoanProgram, ProductQualification, ProductRules, QualificationIssue};
pub use purchase::resolve_purchase_price;
pub use router::qualification_router;
pub use service::{
    AnalysisModeInput, BorrowingPowerQuery, LimitsQuery, LoanTermDefaults, LoanTermsInput,
    QualificationQuery, QualificationService, ServiceError,
};
pub use solver::solve;

/// Ceilings for a program from FICO, LTV and the selection's strong factors.
///
/// The selection is counted as given; `creditHistory` and `nonHousingDTI`
/// are only derived when a full profile is available (see [`solve`]).
pub fn resolve_limits(
    fico: u16,
    ltv: f64,
    program: LoanProgram,
    factors: &CompensatingFactorSelection,
) -> QualificationResult<AllowedDti> {
    domain::validate_fico(fico)?;
    domain::validate_ltv(ltv)?;
    let strong_factor_count = count_strong_factors(factors);
    Ok(limits::resolve(fico, ltv, program, strong_factor_count).allowed)
}
