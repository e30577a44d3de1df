use crate::infra::build_service;
use mortgage_qualify::error::AppError;
use mortgage_qualify::qualification::{
    AnalysisModeInput, BorrowingPowerOutcome, BorrowingPowerQuery, BorrowingPowerResult,
    CompensatingFactorSelection, FinancialProfile, LoanProgram, LoanTermDefaults, LoanTermsInput,
    QualificationQuery,
};

struct DemoBorrower {
    label: &'static str,
    profile: FinancialProfile,
    factors: CompensatingFactorSelection,
}

fn demo_borrowers() -> Vec<DemoBorrower> {
    vec![
        DemoBorrower {
            label: "First-time buyer, thin reserves",
            profile: FinancialProfile {
                annual_income: 68_000.0,
                monthly_debts: 420.0,
                fico: 640,
                ltv: 96.5,
            },
            factors: CompensatingFactorSelection::new()
                .with("cashReserves", "1-2 months")
                .with("employmentHistory", "2-5 years"),
        },
        DemoBorrower {
            label: "Move-up buyer, strong file",
            profile: FinancialProfile {
                annual_income: 145_000.0,
                monthly_debts: 650.0,
                fico: 765,
                ltv: 80.0,
            },
            factors: CompensatingFactorSelection::new()
                .with("cashReserves", "9+ months")
                .with("downPayment", "20%+")
                .with("creditUtilization", "<10%"),
        },
    ]
}

pub(crate) fn run_demo() -> Result<(), AppError> {
    let defaults = LoanTermDefaults::default();
    let (service, audit) = build_service(defaults);

    println!("Mortgage qualification demo");
    println!(
        "- Market assumptions: {:.3}% rate | {} years | {:.2}% tax | ${:.0} insurance | {:.2}% PMI",
        defaults.interest_rate,
        defaults.term_years,
        defaults.property_tax_rate,
        defaults.annual_insurance,
        defaults.pmi_rate
    );

    for borrower in demo_borrowers() {
        println!("\n{}", borrower.label);
        println!(
            "  Income ${:.0}/yr | debts ${:.0}/mo | FICO {} | LTV {:.1}%",
            borrower.profile.annual_income,
            borrower.profile.monthly_debts,
            borrower.profile.fico,
            borrower.profile.ltv
        );

        for program in LoanProgram::ALL {
            let gate = program.validate_qualification(&borrower.profile);
            if !gate.eligible {
                println!("  {}: not eligible", program.label());
                for issue in &gate.issues {
                    println!("    - {}", issue.summary());
                }
                continue;
            }

            let dti = service.solve(QualificationQuery {
                profile_id: Some(borrower.label.to_string()),
                profile: borrower.profile,
                factors: borrower.factors.clone(),
                program: program.key().to_string(),
                terms: LoanTermsInput::default(),
                proposed_piti: None,
            })?;
            println!(
                "  {}: {:.2}% / {:.2}% allowed | max PITI ${:.2} | {} strong factor(s)",
                program.label(),
                dti.allowed.front_end,
                dti.allowed.back_end,
                dti.max_piti,
                dti.strong_factor_count
            );
            for adjustment in &dti.calculation_details.factor_adjustments {
                println!("    - {adjustment}");
            }
        }

        let outcome = service.borrowing_power(BorrowingPowerQuery {
            profile_id: Some(borrower.label.to_string()),
            profile: borrower.profile,
            factors: borrower.factors.clone(),
            terms: LoanTermsInput::default(),
            mode: AnalysisModeInput::Compare,
            program: None,
        })?;

        if let BorrowingPowerOutcome::Compare(comparison) = outcome {
            render_program("FHA", &comparison.fha);
            render_program("Conventional", &comparison.conventional);
            match comparison.recommended {
                Some(program) => println!("  Recommended: {program} ({})", comparison.rationale),
                None => println!("  No clear winner: {}", comparison.rationale),
            }
        }
    }

    println!("\n{} calculations recorded in the audit log", audit.entries().len());
    Ok(())
}

fn render_program(label: &str, result: &BorrowingPowerResult) {
    println!(
        "  {label} preset: price ${} | loan ${} | down ${} | payment ${:.2}/mo",
        result.max_purchase_price,
        result.max_loan_amount,
        result.down_payment_amount,
        result.monthly_payment.total
    );
    for recommendation in &result.recommendations {
        println!("    * {}", recommendation.message);
    }
}
