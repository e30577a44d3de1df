use tracing::debug;

use super::domain::{
    ActualDti, AllowedDti, CalculationDetails, DtiFlag, DtiRequest, DtiResult, FinancialProfile,
};
use super::error::QualificationResult;
use super::factors::EnhancedFactorSet;
use super::limits;

/// Ratios within this distance of a ceiling count as meeting it.
const RATIO_TOLERANCE: f64 = 1e-9;

/// Solves for the maximum payment, or evaluates `proposed_piti` when present.
///
/// Unlike [`resolve_limits`](super::resolve_limits), the strong-factor count
/// includes `creditHistory` (from FICO) and `nonHousingDTI` (from debts and
/// income), replacing any submitted values for those keys. A 720+ borrower
/// therefore carries at least one strong factor here even with an empty
/// selection.
pub fn solve(request: &DtiRequest) -> QualificationResult<DtiResult> {
    request.validate()?;

    let profile = &request.profile;
    let factors = EnhancedFactorSet::classify(
        &request.factors,
        profile.fico,
        profile.monthly_debts,
        profile.monthly_income(),
    );
    let strong_factor_count = factors.strong_factor_count();
    let resolution = limits::resolve(
        profile.fico,
        profile.ltv,
        request.program,
        strong_factor_count,
    );

    let result = solve_with_limits(
        profile,
        resolution.allowed,
        strong_factor_count,
        resolution.adjustments,
        request.proposed_piti,
    );

    debug!(
        program = request.program.key(),
        strong_factor_count,
        allowed_front_end = result.allowed.front_end,
        allowed_back_end = result.allowed.back_end,
        max_piti = result.max_piti,
        evaluate_mode = request.proposed_piti.is_some(),
        "dti solved"
    );

    Ok(result)
}

pub(crate) fn solve_with_limits(
    profile: &FinancialProfile,
    allowed: AllowedDti,
    strong_factor_count: u8,
    factor_adjustments: Vec<String>,
    proposed_piti: Option<f64>,
) -> DtiResult {
    let monthly_income = profile.monthly_income();
    let monthly_debts = profile.monthly_debts;

    let max_from_back_end = monthly_income * (allowed.back_end / 100.0) - monthly_debts;
    let max_from_front_end = monthly_income * (allowed.front_end / 100.0);

    let max_piti = match proposed_piti {
        Some(proposed) => proposed,
        None => max_from_back_end.min(max_from_front_end).max(0.0),
    };

    let actual = actual_ratios(max_piti, monthly_debts, monthly_income);
    let flags = flags_for(&allowed, &actual);

    let max_housing_payment = (monthly_income * allowed.back_end / 100.0)
        .min(monthly_income * allowed.front_end / 100.0);

    DtiResult {
        allowed,
        actual,
        max_piti,
        strong_factor_count,
        flags,
        calculation_details: CalculationDetails {
            monthly_income,
            max_housing_payment,
            available_after_debts: max_housing_payment - monthly_debts,
            factor_adjustments,
        },
    }
}

fn actual_ratios(piti: f64, monthly_debts: f64, monthly_income: f64) -> ActualDti {
    if monthly_income <= 0.0 {
        return ActualDti {
            front_end: 0.0,
            back_end: 0.0,
        };
    }

    ActualDti {
        front_end: piti / monthly_income * 100.0,
        back_end: (piti + monthly_debts) / monthly_income * 100.0,
    }
}

pub(crate) fn flags_for(allowed: &AllowedDti, actual: &ActualDti) -> Vec<DtiFlag> {
    let mut flags = Vec::new();
    if actual.front_end > allowed.front_end + RATIO_TOLERANCE {
        flags.push(DtiFlag::ExceedsFrontEnd);
    }
    if actual.back_end > allowed.back_end + RATIO_TOLERANCE {
        flags.push(DtiFlag::ExceedsBackEnd);
    }
    if flags.is_empty() {
        flags.push(DtiFlag::WithinLimits);
    }
    flags
}
