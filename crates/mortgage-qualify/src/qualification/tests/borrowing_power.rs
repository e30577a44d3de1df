use super::common::*;

use crate::qualification::borrowing_power::{
    affordability_metrics, analyze, compare_borrowing_power, payment_breakdown, AnalysisMode,
    BorrowingPowerOutcome, BorrowingPowerRequest, ProgramPreset, RecommendationKind,
};
use crate::qualification::domain::CompensatingFactorSelection;
use crate::qualification::product::LoanProgram;
use crate::qualification::{analyze_borrowing_power, QualificationError};

fn kinds(recommendations: &[crate::qualification::Recommendation]) -> Vec<RecommendationKind> {
    recommendations.iter().map(|r| r.kind).collect()
}

#[test]
fn presets_match_program_minimums() {
    let fha = ProgramPreset::for_program(LoanProgram::Fha);
    assert_eq!(fha.down_payment_percent, 3.5);
    assert_eq!(fha.ltv, 96.5);

    let conventional = ProgramPreset::for_program(LoanProgram::Conventional);
    assert_eq!(conventional.down_payment_percent, 5.0);
    assert_eq!(conventional.ltv, 95.0);
}

#[test]
fn pmi_only_applies_above_eighty_ltv() {
    let with_pmi = payment_breakdown(400_000.0, 360_000.0, 90.0, &terms());
    assert_close(with_pmi.pmi, 360_000.0 * 0.55 / 100.0 / 12.0);
    assert_close(with_pmi.property_tax, 400_000.0 * 1.1 / 100.0 / 12.0);
    assert_close(with_pmi.insurance, 125.0);

    let without_pmi = payment_breakdown(400_000.0, 320_000.0, 80.0, &terms());
    assert_eq!(without_pmi.pmi, 0.0);
    assert_close(
        without_pmi.total,
        without_pmi.principal_and_interest + without_pmi.property_tax + without_pmi.insurance,
    );
}

#[test]
fn affordability_metrics_use_total_obligations() {
    let borrower = profile(120_000.0, 500.0, 740, 80.0);
    let payment = payment_breakdown(400_000.0, 320_000.0, 80.0, &terms());
    let metrics = affordability_metrics(&borrower, &payment);

    assert_close(metrics.housing_to_income_ratio, payment.total / 100.0);
    assert_close(
        metrics.total_debt_to_income_ratio,
        (payment.total + 500.0) / 100.0,
    );
    assert_close(metrics.monthly_income_remaining, 10_000.0 - payment.total - 500.0);
    assert_close(metrics.debt_coverage, 10_000.0 / (payment.total + 500.0));
}

#[test]
fn debt_coverage_is_zero_without_obligations() {
    let borrower = profile(120_000.0, 0.0, 740, 80.0);
    let payment = payment_breakdown(0.0, 0.0, 80.0, &terms());
    let payment = crate::qualification::PaymentBreakdown {
        insurance: 0.0,
        total: 0.0,
        ..payment
    };
    assert_eq!(affordability_metrics(&borrower, &payment).debt_coverage, 0.0);
}

#[test]
fn single_program_analysis_builds_full_summary() {
    let borrower = profile(120_000.0, 500.0, 740, 90.0);
    let result = analyze(
        &borrower,
        &strong_selection(),
        &terms(),
        LoanProgram::Conventional,
    )
    .expect("analyzes");

    assert_eq!(result.program, LoanProgram::Conventional);
    assert!(result.max_purchase_price > result.max_loan_amount);
    assert_eq!(
        result.down_payment_amount,
        result.max_purchase_price - result.max_loan_amount
    );
    assert!(result.monthly_payment.pmi > 0.0);
    let payment = &result.monthly_payment;
    assert!(payment.total > 0.0 && payment.total < result.dti_result.max_piti);
    assert_close(
        payment.total,
        payment.principal_and_interest + payment.property_tax + payment.insurance + payment.pmi,
    );
    assert!(result.recommendations.is_empty(), "{:?}", result.recommendations);
}

#[test]
fn weak_profile_collects_credit_and_factor_recommendations() {
    let borrower = profile(72_000.0, 400.0, 700, 95.0);
    let result = analyze(
        &borrower,
        &CompensatingFactorSelection::new(),
        &terms(),
        LoanProgram::Fha,
    )
    .expect("analyzes");

    let kinds = kinds(&result.recommendations);
    assert!(kinds.contains(&RecommendationKind::StrengthenCompensatingFactors));
    assert!(kinds.contains(&RecommendationKind::ImproveCredit));
    assert!(!kinds.contains(&RecommendationKind::ConsiderConventional));
    assert!(!kinds.contains(&RecommendationKind::ReduceDebt));
}

#[test]
fn program_switch_suggestions_follow_fico() {
    let strong_credit = profile(150_000.0, 300.0, 760, 96.5);
    let fha = analyze(
        &strong_credit,
        &strong_selection(),
        &terms(),
        LoanProgram::Fha,
    )
    .expect("analyzes");
    assert!(kinds(&fha.recommendations).contains(&RecommendationKind::ConsiderConventional));

    let weak_credit = profile(80_000.0, 300.0, 660, 95.0);
    let conventional = analyze(
        &weak_credit,
        &strong_selection(),
        &terms(),
        LoanProgram::Conventional,
    )
    .expect("analyzes");
    assert!(kinds(&conventional.recommendations).contains(&RecommendationKind::ConsiderFha));
}

#[test]
fn overextended_borrower_gets_debt_and_flexibility_warnings() {
    let borrower = profile(24_000.0, 1_000.0, 690, 95.0);
    let result = analyze(
        &borrower,
        &CompensatingFactorSelection::new(),
        &terms(),
        LoanProgram::Conventional,
    )
    .expect("analyzes");

    assert_eq!(result.max_purchase_price, 0);
    let kinds = kinds(&result.recommendations);
    assert!(kinds.contains(&RecommendationKind::ReduceDebt));
    assert!(kinds.contains(&RecommendationKind::LimitedFlexibility));
}

#[test]
fn comparison_prefers_conventional_for_top_credit() {
    let borrower = profile(110_000.0, 400.0, 745, 90.0);
    let comparison =
        compare_borrowing_power(&borrower, &CompensatingFactorSelection::new(), &terms())
            .expect("compares");

    assert_eq!(comparison.recommended, Some(LoanProgram::Conventional));
    assert_eq!(comparison.fha.program, LoanProgram::Fha);
    assert_eq!(
        comparison.price_difference,
        comparison
            .fha
            .max_purchase_price
            .abs_diff(comparison.conventional.max_purchase_price)
    );
}

#[test]
fn comparison_applies_program_presets() {
    let borrower = profile(110_000.0, 400.0, 700, 70.0);
    let comparison =
        compare_borrowing_power(&borrower, &CompensatingFactorSelection::new(), &terms())
            .expect("compares");

    let fha_ltv = comparison.fha.max_loan_amount as f64 / comparison.fha.max_purchase_price as f64;
    let conventional_ltv = comparison.conventional.max_loan_amount as f64
        / comparison.conventional.max_purchase_price as f64;
    assert!((fha_ltv - 0.965).abs() < 1e-4);
    assert!((conventional_ltv - 0.95).abs() < 1e-4);
}

#[test]
fn comparison_prefers_fha_below_conventional_minimum() {
    let borrower = profile(90_000.0, 400.0, 600, 90.0);
    let comparison =
        compare_borrowing_power(&borrower, &CompensatingFactorSelection::new(), &terms())
            .expect("compares");
    assert_eq!(comparison.recommended, Some(LoanProgram::Fha));
}

#[test]
fn comparison_picks_larger_price_when_gap_is_material() {
    let borrower = profile(120_000.0, 500.0, 700, 90.0);
    let comparison =
        compare_borrowing_power(&borrower, &CompensatingFactorSelection::new(), &terms())
            .expect("compares");

    assert!(comparison.price_difference > 10_000);
    assert!(comparison.fha.max_purchase_price > comparison.conventional.max_purchase_price);
    assert_eq!(comparison.recommended, Some(LoanProgram::Fha));
}

#[test]
fn comparison_stays_neutral_when_programs_are_close() {
    let borrower = profile(24_000.0, 200.0, 700, 90.0);
    let comparison =
        compare_borrowing_power(&borrower, &CompensatingFactorSelection::new(), &terms())
            .expect("compares");

    assert!(comparison.price_difference <= 10_000, "{}", comparison.price_difference);
    assert_eq!(comparison.recommended, None);
}

#[test]
fn analyze_entry_point_dispatches_on_mode() {
    let request = BorrowingPowerRequest {
        profile: profile(120_000.0, 500.0, 740, 90.0),
        factors: CompensatingFactorSelection::new(),
        terms: terms(),
        mode: AnalysisMode::Single {
            program: LoanProgram::Fha,
        },
    };
    match analyze_borrowing_power(&request).expect("analyzes") {
        BorrowingPowerOutcome::Single(result) => assert_eq!(result.program, LoanProgram::Fha),
        other => panic!("expected single outcome, got {other:?}"),
    }

    let compare = BorrowingPowerRequest {
        mode: AnalysisMode::Compare,
        ..request.clone()
    };
    assert!(matches!(
        analyze_borrowing_power(&compare),
        Ok(BorrowingPowerOutcome::Compare(_))
    ));

    let invalid = BorrowingPowerRequest {
        profile: profile(-1.0, 0.0, 700, 90.0),
        ..request
    };
    assert!(matches!(
        analyze_borrowing_power(&invalid),
        Err(QualificationError::InvalidInput { .. })
    ));
}

#[test]
fn request_mode_is_flattened_on_the_wire() {
    let body = serde_json::json!({
        "profile": { "annualIncome": 90000, "monthlyDebts": 300, "fico": 710, "ltv": 95 },
        "terms": {
            "propertyTaxRate": 1.1,
            "annualInsurance": 1500,
            "downPaymentPercent": 5,
            "pmiRate": 0.55,
            "interestRate": 6.75,
            "termYears": 30
        },
        "mode": "single",
        "program": "fha"
    });
    let request: BorrowingPowerRequest = serde_json::from_value(body).expect("deserializes");
    assert_eq!(
        request.mode,
        AnalysisMode::Single {
            program: LoanProgram::Fha
        }
    );
}
