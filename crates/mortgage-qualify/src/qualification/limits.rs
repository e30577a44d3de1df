//! Tiered front-end/back-end ceilings for each loan program.
//!
//! The tables below follow the 2025 guideline grid. FHA strong-factor tiers
//! replace the ceilings outright instead of stacking on the FICO boost.

use super::domain::AllowedDti;
use super::product::LoanProgram;

const CONVENTIONAL_FRONT_END_CAP: f64 = 36.0;
const CONVENTIONAL_BACK_END_CAP: f64 = 50.0;

const FHA_FRONT_END_CAP: f64 = 40.0;
const FHA_BACK_END_CAP: f64 = 56.99;

const FHA_TWO_FACTOR_FRONT_BOOST: f64 = 9.0;
const FHA_TWO_FACTOR_BACK_BOOST: f64 = 13.99;
const FHA_ONE_FACTOR_FRONT_CAP: f64 = 37.0;
const FHA_ONE_FACTOR_FRONT_BOOST: f64 = 6.0;
const FHA_ONE_FACTOR_BACK_CAP: f64 = 47.0;
const FHA_ONE_FACTOR_BACK_BOOST: f64 = 4.0;

/// Resolved ceilings and the adjustments that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct LimitResolution {
    pub allowed: AllowedDti,
    pub adjustments: Vec<String>,
}

pub fn resolve(
    fico: u16,
    ltv: f64,
    program: LoanProgram,
    strong_factor_count: u8,
) -> LimitResolution {
    match program {
        LoanProgram::Conventional => resolve_conventional(fico, ltv, strong_factor_count),
        LoanProgram::Fha => resolve_fha(fico, strong_factor_count),
    }
}

/// Upper bounds no resolved ceiling may exceed.
pub fn hard_caps(program: LoanProgram) -> AllowedDti {
    match program {
        LoanProgram::Conventional => AllowedDti {
            front_end: CONVENTIONAL_FRONT_END_CAP,
            back_end: CONVENTIONAL_BACK_END_CAP,
        },
        LoanProgram::Fha => AllowedDti {
            front_end: FHA_FRONT_END_CAP,
            back_end: FHA_BACK_END_CAP,
        },
    }
}

fn resolve_conventional(fico: u16, ltv: f64, strong_factor_count: u8) -> LimitResolution {
    let defaults = LoanProgram::Conventional.default_limits();
    let mut front_end = defaults.front_end;
    let mut back_end = defaults.back_end;
    let mut adjustments = Vec::new();

    if fico >= 720 {
        back_end += 3.0;
        adjustments.push(format!("FICO {fico} (720+): back-end +3%"));
    } else if fico >= 680 {
        back_end += 2.0;
        adjustments.push(format!("FICO {fico} (680-719): back-end +2%"));
    }

    if ltv <= 75.0 {
        back_end += 3.0;
        adjustments.push(format!("LTV {ltv} (75 or below): back-end +3%"));
    } else if ltv <= 80.0 {
        back_end += 2.0;
        adjustments.push(format!("LTV {ltv} (80 or below): back-end +2%"));
    }

    if strong_factor_count >= 2 {
        back_end += 5.0;
        adjustments.push(format!(
            "{strong_factor_count} strong compensating factors: back-end +5%"
        ));
    } else if strong_factor_count == 1 {
        back_end += 2.0;
        adjustments.push("1 strong compensating factor: back-end +2%".to_string());
    }

    front_end = front_end.min(CONVENTIONAL_FRONT_END_CAP);
    if back_end > CONVENTIONAL_BACK_END_CAP {
        back_end = CONVENTIONAL_BACK_END_CAP;
        adjustments.push(format!(
            "back-end capped at conventional maximum {CONVENTIONAL_BACK_END_CAP}%"
        ));
    }

    LimitResolution {
        allowed: AllowedDti {
            front_end,
            back_end,
        },
        adjustments,
    }
}

fn resolve_fha(fico: u16, strong_factor_count: u8) -> LimitResolution {
    let defaults = LoanProgram::Fha.default_limits();
    let mut front_end = defaults.front_end;
    let mut back_end = defaults.back_end;
    let mut adjustments = Vec::new();

    if fico >= 720 {
        back_end += 5.0;
        adjustments.push(format!("FICO {fico} (720+): back-end +5%"));
    } else if fico >= 680 {
        back_end += 3.0;
        adjustments.push(format!("FICO {fico} (680-719): back-end +3%"));
    }

    if strong_factor_count >= 2 {
        front_end = FHA_FRONT_END_CAP.min(defaults.front_end + FHA_TWO_FACTOR_FRONT_BOOST);
        back_end = FHA_BACK_END_CAP.min(defaults.back_end + FHA_TWO_FACTOR_BACK_BOOST);
        adjustments.push(format!(
            "{strong_factor_count} strong compensating factors: front-end {front_end}%, back-end {back_end}%"
        ));
    } else if strong_factor_count == 1 {
        front_end = FHA_ONE_FACTOR_FRONT_CAP.min(defaults.front_end + FHA_ONE_FACTOR_FRONT_BOOST);
        back_end = FHA_ONE_FACTOR_BACK_CAP.min(defaults.back_end + FHA_ONE_FACTOR_BACK_BOOST);
        adjustments.push(format!(
            "1 strong compensating factor: front-end {front_end}%, back-end {back_end}%"
        ));
    }

    LimitResolution {
        allowed: AllowedDti {
            front_end: front_end.min(FHA_FRONT_END_CAP),
            back_end: back_end.min(FHA_BACK_END_CAP),
        },
        adjustments,
    }
}
