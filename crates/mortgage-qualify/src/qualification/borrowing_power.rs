use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{
    CompensatingFactorSelection, DtiFlag, DtiRequest, DtiResult, FinancialProfile, LoanTerms,
};
use super::error::QualificationResult;
use super::product::LoanProgram;
use super::purchase::{monthly_principal_and_interest, price_from_dti};
use super::solver;

const PMI_LTV_THRESHOLD: f64 = 80.0;
const COMPARISON_PRICE_GAP: u64 = 10_000;
const LOW_REMAINING_INCOME: f64 = 1_000.0;
const HIGH_HOUSING_RATIO: f64 = 35.0;

/// Down payment and LTV applied to each program when comparing side by side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgramPreset {
    pub down_payment_percent: f64,
    pub ltv: f64,
}

impl ProgramPreset {
    pub fn for_program(program: LoanProgram) -> Self {
        match program {
            LoanProgram::Fha => Self {
                down_payment_percent: 3.5,
                ltv: 96.5,
            },
            LoanProgram::Conventional => Self {
                down_payment_percent: 5.0,
                ltv: 95.0,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowingPowerRequest {
    pub profile: FinancialProfile,
    #[serde(default)]
    pub factors: CompensatingFactorSelection,
    pub terms: LoanTerms,
    #[serde(flatten)]
    pub mode: AnalysisMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "mode")]
pub enum AnalysisMode {
    Single { program: LoanProgram },
    Compare,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "mode")]
pub enum BorrowingPowerOutcome {
    Single(BorrowingPowerResult),
    Compare(ProgramComparison),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBreakdown {
    pub principal_and_interest: f64,
    pub property_tax: f64,
    pub insurance: f64,
    pub pmi: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffordabilityMetrics {
    pub housing_to_income_ratio: f64,
    pub total_debt_to_income_ratio: f64,
    pub monthly_income_remaining: f64,
    pub debt_coverage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecommendationKind {
    ReduceDebt,
    LowerPurchasePrice,
    StrengthenCompensatingFactors,
    ImproveCredit,
    ConsiderConventional,
    ConsiderFha,
    LimitedFlexibility,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub message: String,
}

impl Recommendation {
    fn new(kind: RecommendationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowingPowerResult {
    pub program: LoanProgram,
    pub max_purchase_price: u64,
    pub max_loan_amount: u64,
    pub down_payment_amount: u64,
    pub monthly_payment: PaymentBreakdown,
    pub affordability: AffordabilityMetrics,
    pub dti_result: DtiResult,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramComparison {
    pub fha: BorrowingPowerResult,
    pub conventional: BorrowingPowerResult,
    pub recommended: Option<LoanProgram>,
    pub price_difference: u64,
    pub rationale: String,
}

pub fn analyze_borrowing_power(
    request: &BorrowingPowerRequest,
) -> QualificationResult<BorrowingPowerOutcome> {
    match request.mode {
        AnalysisMode::Single { program } => analyze(
            &request.profile,
            &request.factors,
            &request.terms,
            program,
        )
        .map(BorrowingPowerOutcome::Single),
        AnalysisMode::Compare => compare_borrowing_power(
            &request.profile,
            &request.factors,
            &request.terms,
        )
        .map(BorrowingPowerOutcome::Compare),
    }
}

/// Borrowing power for one program using the caller's own LTV and terms.
pub fn analyze(
    profile: &FinancialProfile,
    factors: &CompensatingFactorSelection,
    terms: &LoanTerms,
    program: LoanProgram,
) -> QualificationResult<BorrowingPowerResult> {
    let request = DtiRequest {
        profile: *profile,
        factors: factors.clone(),
        program,
        terms: *terms,
        proposed_piti: None,
    };
    let dti_result = solver::solve(&request)?;
    let price = price_from_dti(dti_result, profile.ltv, terms);

    let monthly_payment = payment_breakdown(
        price.max_purchase_price as f64,
        price.max_loan_amount as f64,
        profile.ltv,
        terms,
    );
    let affordability = affordability_metrics(profile, &monthly_payment);
    let recommendations = recommendations_for(program, profile, &price.dti_result, &affordability);

    debug!(
        program = program.key(),
        max_purchase_price = price.max_purchase_price,
        monthly_total = monthly_payment.total,
        recommendations = recommendations.len(),
        "borrowing power analyzed"
    );

    Ok(BorrowingPowerResult {
        program,
        max_purchase_price: price.max_purchase_price,
        max_loan_amount: price.max_loan_amount,
        down_payment_amount: price.max_purchase_price.saturating_sub(price.max_loan_amount),
        monthly_payment,
        affordability,
        dti_result: price.dti_result,
        recommendations,
    })
}

/// Runs both programs on their comparison presets and picks one when the
/// difference is material.
pub fn compare_borrowing_power(
    profile: &FinancialProfile,
    factors: &CompensatingFactorSelection,
    terms: &LoanTerms,
) -> QualificationResult<ProgramComparison> {
    let run = |program: LoanProgram| {
        let preset = ProgramPreset::for_program(program);
        let profile = FinancialProfile {
            ltv: preset.ltv,
            ..*profile
        };
        let terms = LoanTerms {
            down_payment_percent: preset.down_payment_percent,
            ..*terms
        };
        analyze(&profile, factors, &terms, program)
    };

    let fha = run(LoanProgram::Fha)?;
    let conventional = run(LoanProgram::Conventional)?;
    let price_difference = fha.max_purchase_price.abs_diff(conventional.max_purchase_price);

    let (recommended, rationale) = if profile.fico >= 740 {
        (
            Some(LoanProgram::Conventional),
            format!(
                "credit score {} qualifies for top-tier conventional pricing and cancellable PMI",
                profile.fico
            ),
        )
    } else if profile.fico < 620 {
        (
            Some(LoanProgram::Fha),
            format!(
                "credit score {} is below the conventional minimum of 620",
                profile.fico
            ),
        )
    } else if price_difference > COMPARISON_PRICE_GAP {
        let winner = if fha.max_purchase_price > conventional.max_purchase_price {
            LoanProgram::Fha
        } else {
            LoanProgram::Conventional
        };
        (
            Some(winner),
            format!("{winner} supports ${price_difference} more purchase price"),
        )
    } else {
        (
            None,
            format!(
                "programs are within ${COMPARISON_PRICE_GAP} of each other; compare closing costs and mortgage insurance"
            ),
        )
    };

    Ok(ProgramComparison {
        fha,
        conventional,
        recommended,
        price_difference,
        rationale,
    })
}

pub(crate) fn payment_breakdown(
    purchase_price: f64,
    loan_amount: f64,
    ltv: f64,
    terms: &LoanTerms,
) -> PaymentBreakdown {
    let principal_and_interest = monthly_principal_and_interest(loan_amount, terms);
    let property_tax = purchase_price * terms.property_tax_rate / 100.0 / 12.0;
    let insurance = terms.annual_insurance / 12.0;
    let pmi = if ltv > PMI_LTV_THRESHOLD {
        loan_amount * terms.pmi_rate / 100.0 / 12.0
    } else {
        0.0
    };

    PaymentBreakdown {
        principal_and_interest,
        property_tax,
        insurance,
        pmi,
        total: principal_and_interest + property_tax + insurance + pmi,
    }
}

pub(crate) fn affordability_metrics(
    profile: &FinancialProfile,
    payment: &PaymentBreakdown,
) -> AffordabilityMetrics {
    let monthly_income = profile.monthly_income();
    let obligations = payment.total + profile.monthly_debts;

    let ratio = |amount: f64| {
        if monthly_income > 0.0 {
            amount / monthly_income * 100.0
        } else {
            0.0
        }
    };

    AffordabilityMetrics {
        housing_to_income_ratio: ratio(payment.total),
        total_debt_to_income_ratio: ratio(obligations),
        monthly_income_remaining: monthly_income - obligations,
        debt_coverage: if obligations > 0.0 {
            monthly_income / obligations
        } else {
            0.0
        },
    }
}

pub(crate) fn recommendations_for(
    program: LoanProgram,
    profile: &FinancialProfile,
    dti: &DtiResult,
    metrics: &AffordabilityMetrics,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if dti.has_flag(DtiFlag::ExceedsBackEnd) {
        recommendations.push(Recommendation::new(
            RecommendationKind::ReduceDebt,
            "Total debt exceeds the back-end limit; pay down monthly debts or increase the down payment",
        ));
    }

    if dti.has_flag(DtiFlag::ExceedsFrontEnd) {
        recommendations.push(Recommendation::new(
            RecommendationKind::LowerPurchasePrice,
            "Housing payment exceeds the front-end limit; consider a lower purchase price",
        ));
    }

    if dti.strong_factor_count < 2 {
        recommendations.push(Recommendation::new(
            RecommendationKind::StrengthenCompensatingFactors,
            format!(
                "Only {} strong compensating factor(s); building 6+ months of reserves or lowering credit utilization below 10% can raise your DTI ceiling",
                dti.strong_factor_count
            ),
        ));
    }

    if profile.fico < 720 {
        recommendations.push(Recommendation::new(
            RecommendationKind::ImproveCredit,
            format!(
                "Raising your credit score from {} to 720+ unlocks higher DTI allowances and better rates",
                profile.fico
            ),
        ));
    }

    match program {
        LoanProgram::Fha if profile.fico >= 740 => {
            recommendations.push(Recommendation::new(
                RecommendationKind::ConsiderConventional,
                "With a 740+ score, a conventional loan may avoid FHA's lifetime mortgage insurance",
            ));
        }
        LoanProgram::Conventional if profile.fico < 680 => {
            recommendations.push(Recommendation::new(
                RecommendationKind::ConsiderFha,
                "Below 680, FHA typically allows higher DTI ratios and cheaper pricing",
            ));
        }
        _ => {}
    }

    if metrics.monthly_income_remaining < LOW_REMAINING_INCOME
        || metrics.housing_to_income_ratio > HIGH_HOUSING_RATIO
    {
        recommendations.push(Recommendation::new(
            RecommendationKind::LimitedFlexibility,
            format!(
                "Only ${:.0} remains each month at {:.1}% housing-to-income; budget for maintenance and emergencies",
                metrics.monthly_income_remaining, metrics.housing_to_income_ratio
            ),
        ));
    }

    recommendations
}
