use tracing::debug;

use super::domain::{DtiRequest, DtiResult, LoanTerms, PurchasePriceResult};
use super::error::QualificationResult;
use super::solver;

/// Converts the request's affordable payment into a maximum price and loan.
pub fn resolve_purchase_price(request: &DtiRequest) -> QualificationResult<PurchasePriceResult> {
    let dti_result = solver::solve(request)?;
    Ok(price_from_dti(dti_result, request.profile.ltv, &request.terms))
}

pub(crate) fn price_from_dti(
    dti_result: DtiResult,
    ltv: f64,
    terms: &LoanTerms,
) -> PurchasePriceResult {
    let (max_purchase_price, max_loan_amount) = invert_payment(dti_result.max_piti, ltv, terms);

    debug!(
        max_piti = dti_result.max_piti,
        max_purchase_price, max_loan_amount, "purchase price resolved"
    );

    PurchasePriceResult {
        max_purchase_price,
        max_loan_amount,
        dti_result,
    }
}

/// Returns `(price, loan)` for a total monthly PITI budget.
pub(crate) fn invert_payment(max_piti: f64, ltv: f64, terms: &LoanTerms) -> (u64, u64) {
    if max_piti <= 0.0 {
        return (0, 0);
    }

    let monthly_rate = terms.interest_rate / 100.0 / 12.0;
    let payments = f64::from(terms.term_months());
    let loan_to_value = ltv / 100.0;

    let pi_multiplier = if monthly_rate == 0.0 {
        1.0 / (payments * loan_to_value)
    } else {
        let growth = (1.0 + monthly_rate).powf(payments);
        monthly_rate * growth / (growth - 1.0) / loan_to_value
    };

    let total_multiplier = pi_multiplier
        + (terms.property_tax_rate / 100.0) / 12.0
        + (terms.pmi_rate / 100.0) * loan_to_value / 12.0;

    let price = ((max_piti - terms.annual_insurance / 12.0) / total_multiplier)
        .max(0.0)
        .floor();
    let loan = (price * loan_to_value).max(0.0).floor();

    (price as u64, loan as u64)
}

/// Standard annuity payment for `principal` over the loan term.
pub fn monthly_principal_and_interest(principal: f64, terms: &LoanTerms) -> f64 {
    if principal <= 0.0 {
        return 0.0;
    }

    let monthly_rate = terms.interest_rate / 100.0 / 12.0;
    let payments = f64::from(terms.term_months());
    if monthly_rate == 0.0 {
        return principal / payments;
    }

    let growth = (1.0 + monthly_rate).powf(payments);
    principal * monthly_rate * growth / (growth - 1.0)
}
