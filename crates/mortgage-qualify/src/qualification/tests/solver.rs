use super::common::*;

use crate::qualification::domain::{
    AllowedDti, CompensatingFactorSelection, DtiFlag, LoanTerms, MAX_TERM_YEARS,
};
use crate::qualification::product::LoanProgram;
use crate::qualification::solver::{flags_for, solve_with_limits};
use crate::qualification::{resolve_limits, resolve_purchase_price, solve, QualificationError};

#[test]
fn guideline_example_with_explicit_limits() {
    let request = baseline_request();
    let allowed = AllowedDti {
        front_end: 28.0,
        back_end: 41.0,
    };

    let result = solve_with_limits(&request.profile, allowed, 0, Vec::new(), None);

    assert_close(result.calculation_details.monthly_income, 10_000.0);
    assert_close(result.max_piti, 2_800.0);
    assert_close(result.actual.front_end, 28.0);
    assert_close(result.actual.back_end, 33.0);
    assert_close(result.calculation_details.max_housing_payment, 2_800.0);
    assert_close(result.calculation_details.available_after_debts, 2_300.0);
    assert_eq!(result.flags, vec![DtiFlag::WithinLimits]);
}

#[test]
fn full_pipeline_counts_derived_credit_history() {
    let result = solve(&baseline_request()).expect("solves");

    // fico 740 lands in the strong 720-759 bucket; 5% non-housing DTI does not
    assert_eq!(result.strong_factor_count, 1);
    assert_close(result.allowed.back_end, 43.0);
    assert_close(result.allowed.front_end, 28.0);
    assert_close(result.max_piti, 2_800.0);
    assert_eq!(result.flags, vec![DtiFlag::WithinLimits]);
    assert_eq!(result.calculation_details.factor_adjustments.len(), 3);
}

#[test]
fn submitted_credit_history_is_replaced_by_score_in_pipeline() {
    let mut request = request(profile(120_000.0, 500.0, 650, 80.0), LoanProgram::Conventional);
    request.factors = CompensatingFactorSelection::new().with("creditHistory", "760+");

    let as_given = resolve_limits(650, 80.0, LoanProgram::Conventional, &request.factors)
        .expect("limits resolve");
    assert_close(as_given.back_end, 40.0);

    let solved = solve(&request).expect("solves");
    assert_eq!(solved.strong_factor_count, 0);
    assert_close(solved.allowed.back_end, 38.0);
}

#[test]
fn back_end_binds_when_debts_are_heavy() {
    let mut request = baseline_request();
    request.profile.monthly_debts = 2_000.0;

    let result = solve(&request).expect("solves");

    // 36 + 3 (fico) + 2 (ltv) + 2 (credit history) = 43
    assert_close(result.max_piti, 10_000.0 * 0.43 - 2_000.0);
    assert!(result.max_piti < 10_000.0 * 0.28);
    assert_close(result.actual.back_end, 43.0);
    assert!(result.within_limits());
}

#[test]
fn conventional_fico_step_raises_back_end_by_three() {
    let mut below = baseline_request();
    below.profile.fico = 719;
    let mut at = baseline_request();
    at.profile.fico = 720;

    let below = solve(&below).expect("solves");
    let at = solve(&at).expect("solves");

    assert_close(at.allowed.back_end - below.allowed.back_end, 3.0);
}

#[test]
fn fha_pipeline_with_two_selected_strong_factors() {
    let mut request = request(profile(90_000.0, 600.0, 700, 90.0), LoanProgram::Fha);
    request.factors = strong_selection();

    let result = solve(&request).expect("solves");

    assert_eq!(result.strong_factor_count, 2);
    assert_close(result.allowed.front_end, 40.0);
    assert_close(result.allowed.back_end, 56.99);
    assert_close(result.max_piti, 7_500.0 * 0.40);
}

#[test]
fn solved_payment_evaluates_within_limits() {
    for program in LoanProgram::ALL {
        for (income, debts, fico) in [
            (120_000.0, 500.0, 740),
            (48_000.0, 900.0, 655),
            (210_000.0, 4_200.0, 802),
            (73_500.0, 0.0, 690),
        ] {
            let mut request = request(profile(income, debts, fico, 92.0), program);
            request.factors = strong_selection();
            let solved = solve(&request).expect("solves");

            request.proposed_piti = Some(solved.max_piti);
            let evaluated = solve(&request).expect("evaluates");

            assert_eq!(evaluated.flags, vec![DtiFlag::WithinLimits], "{program} {income}");
            assert_eq!(evaluated.max_piti, solved.max_piti);
        }
    }
}

#[test]
fn evaluate_mode_passes_proposal_through_and_flags_both_ratios() {
    let mut request = baseline_request();
    request.proposed_piti = Some(4_000.0);

    let result = solve(&request).expect("evaluates");

    assert_close(result.max_piti, 4_000.0);
    assert_close(result.actual.front_end, 40.0);
    assert_close(result.actual.back_end, 45.0);
    assert_eq!(
        result.flags,
        vec![DtiFlag::ExceedsFrontEnd, DtiFlag::ExceedsBackEnd]
    );
    assert!(!result.within_limits());
}

#[test]
fn boundary_equality_does_not_flag() {
    let allowed = AllowedDti {
        front_end: 31.0,
        back_end: 43.0,
    };
    assert_eq!(flags_for(&allowed, &allowed), vec![DtiFlag::WithinLimits]);

    let over = AllowedDti {
        front_end: 31.0,
        back_end: 43.01,
    };
    assert_eq!(flags_for(&allowed, &over), vec![DtiFlag::ExceedsBackEnd]);
}

#[test]
fn overwhelming_debt_clamps_payment_to_zero_and_flags() {
    let request = request(profile(60_000.0, 3_000.0, 700, 95.0), LoanProgram::Conventional);

    let result = solve(&request).expect("solves");

    assert_eq!(result.max_piti, 0.0);
    assert_close(result.actual.back_end, 60.0);
    assert_eq!(result.flags, vec![DtiFlag::ExceedsBackEnd]);
    assert!(result.calculation_details.available_after_debts < 0.0);
}

#[test]
fn rejects_non_positive_income_before_solving() {
    let request = request(profile(0.0, 100.0, 700, 90.0), LoanProgram::Fha);
    let err = solve(&request).expect_err("zero income rejected");
    assert!(matches!(
        err,
        QualificationError::InvalidInput {
            field: "annualIncome",
            ..
        }
    ));
}

#[test]
fn rejects_invalid_loan_terms_and_proposals() {
    let mut request = baseline_request();
    request.terms.term_years = 0;
    assert!(matches!(
        solve(&request),
        Err(QualificationError::InvalidInput { field: "termYears", .. })
    ));

    let mut request = baseline_request();
    request.proposed_piti = Some(-1.0);
    assert!(matches!(
        solve(&request),
        Err(QualificationError::InvalidInput {
            field: "proposedPITI",
            ..
        })
    ));

    let mut request = baseline_request();
    request.profile.monthly_debts = f64::NAN;
    assert!(solve(&request).is_err());
}

#[test]
fn rejects_terms_longer_than_amortization_limit() {
    let mut request = baseline_request();
    request.terms.term_years = 400_000_000;
    assert!(matches!(
        resolve_purchase_price(&request),
        Err(QualificationError::InvalidInput { field: "termYears", .. })
    ));

    request.terms.term_years = MAX_TERM_YEARS + 1;
    assert!(solve(&request).is_err());

    request.terms.term_years = MAX_TERM_YEARS;
    assert!(solve(&request).is_ok());
}

#[test]
fn term_months_saturates_instead_of_wrapping() {
    let terms = LoanTerms {
        term_years: u32::MAX,
        ..terms()
    };
    assert_eq!(terms.term_months(), u32::MAX);
}
