use super::common::*;

use crate::qualification::domain::CompensatingFactorSelection;
use crate::qualification::limits::{hard_caps, resolve};
use crate::qualification::product::LoanProgram;
use crate::qualification::{resolve_limits, QualificationError};

#[test]
fn conventional_guideline_example_without_strong_factors() {
    let allowed = resolve_limits(
        740,
        80.0,
        LoanProgram::Conventional,
        &CompensatingFactorSelection::new(),
    )
    .expect("limits resolve");

    assert_close(allowed.back_end, 41.0);
    assert_close(allowed.front_end, 28.0);
}

#[test]
fn conventional_tiers_stack_by_category() {
    let resolution = resolve(760, 70.0, LoanProgram::Conventional, 2);
    assert_close(resolution.allowed.back_end, 36.0 + 3.0 + 3.0 + 5.0);
    assert_close(resolution.allowed.front_end, 28.0);
    assert_eq!(resolution.adjustments.len(), 3);

    let resolution = resolve(690, 85.0, LoanProgram::Conventional, 1);
    assert_close(resolution.allowed.back_end, 36.0 + 2.0 + 2.0);

    let resolution = resolve(640, 95.0, LoanProgram::Conventional, 0);
    assert_close(resolution.allowed.back_end, 36.0);
    assert!(resolution.adjustments.is_empty());
}

#[test]
fn conventional_fico_boundary_with_fixed_factor_count() {
    let below = resolve(719, 80.0, LoanProgram::Conventional, 0).allowed;
    let at = resolve(720, 80.0, LoanProgram::Conventional, 0).allowed;
    assert_close(at.back_end - below.back_end, 1.0);
}

#[test]
fn fha_two_strong_factors_use_absolute_ceilings() {
    let allowed = resolve(700, 90.0, LoanProgram::Fha, 2).allowed;
    assert_close(allowed.front_end, 40.0);
    assert_close(allowed.back_end, 56.99);
}

#[test]
fn fha_single_strong_factor_replaces_fico_boost() {
    let allowed = resolve(740, 96.5, LoanProgram::Fha, 1).allowed;
    assert_close(allowed.front_end, 37.0);
    assert_close(allowed.back_end, 47.0);
}

#[test]
fn fha_without_strong_factors_keeps_fico_tier() {
    assert_close(resolve(650, 96.5, LoanProgram::Fha, 0).allowed.back_end, 43.0);
    assert_close(resolve(700, 96.5, LoanProgram::Fha, 0).allowed.back_end, 46.0);
    let top = resolve(720, 96.5, LoanProgram::Fha, 0);
    assert_close(top.allowed.back_end, 48.0);
    assert_close(top.allowed.front_end, 31.0);
    assert_eq!(top.adjustments, vec!["FICO 720 (720+): back-end +5%".to_string()]);
}

#[test]
fn ceilings_never_exceed_program_caps() {
    for program in LoanProgram::ALL {
        let caps = hard_caps(program);
        for fico in [300_u16, 620, 679, 680, 719, 720, 850] {
            for ltv in [50.0, 75.0, 80.0, 90.0, 100.0] {
                for strong in 0..=9_u8 {
                    let allowed = resolve(fico, ltv, program, strong).allowed;
                    assert!(allowed.front_end <= caps.front_end, "{program} front-end");
                    assert!(allowed.back_end <= caps.back_end, "{program} back-end");
                }
            }
        }
    }
}

#[test]
fn resolve_limits_rejects_out_of_range_inputs() {
    let factors = CompensatingFactorSelection::new();
    let err = resolve_limits(900, 80.0, LoanProgram::Fha, &factors).expect_err("fico rejected");
    assert!(matches!(err, QualificationError::InvalidInput { field: "fico", .. }));

    let err = resolve_limits(700, 0.0, LoanProgram::Fha, &factors).expect_err("ltv rejected");
    assert!(matches!(err, QualificationError::InvalidInput { field: "ltv", .. }));

    assert!(resolve_limits(700, 100.0, LoanProgram::Fha, &factors).is_ok());
}
